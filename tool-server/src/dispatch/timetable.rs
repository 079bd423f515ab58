//! High speed rail timetable tool.

use serde_json::Value;

use super::ToolHandler;
use super::error::ToolError;
use super::schema::{ParamSpec, ToolArgs, ToolName, ToolSpec};
use crate::stations::Station;
use crate::timetable::{ReportOptions, TimetableClient, TimetableRequest, Transport};

/// The `taiwan_high_speed_rail_timetable` tool.
///
/// Lists up to five trains leaving strictly after the requested time. The
/// client is driven to completion on the calling thread, so it should sit
/// on the blocking transport.
#[derive(Debug)]
pub struct TimetableTool<T> {
    client: TimetableClient<T>,
    spec: ToolSpec,
}

impl<T: Transport> TimetableTool<T> {
    pub fn new(client: TimetableClient<T>) -> Self {
        let codes = Station::ALL.map(|s| s.code());
        let spec = ToolSpec::new(
            ToolName::Timetable,
            "For the timetable of the Taiwan High Speed Rail, always use this tool to search \
             trains between two stations. Returns the next trains departing after the given \
             time, with fares.",
        )
        .param(
            ParamSpec::string(
                "startStation",
                "The starting station of the journey, as a station code or its Chinese name. \
                 For example, \"TaiPei\" means 台北.",
            )
            .allowed(codes),
        )
        .param(
            ParamSpec::string(
                "destinationStation",
                "The destination station of the journey, as a station code or its Chinese \
                 name. For example, \"TaiZhong\" means 台中.",
            )
            .allowed(codes),
        )
        .param(ParamSpec::string(
            "queryDate",
            "The travel date in 'YYYY/MM/DD' format. For example, \"2025/05/27\".",
        ))
        .param(ParamSpec::string(
            "queryTime",
            "The earliest departure time in 'HH:MM' format (24-hour clock). For example, \"14:30\".",
        ));
        Self { client, spec }
    }
}

impl<T: Transport> ToolHandler for TimetableTool<T> {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    fn call(&self, args: &ToolArgs) -> Result<Value, ToolError> {
        let request = TimetableRequest::new(
            args.str("startStation"),
            args.str("destinationStation"),
            args.str("queryDate"),
            args.str("queryTime"),
        );
        let options = ReportOptions::default().after(request.time.clone());
        Ok(Value::String(self.client.search_blocking(&request, &options)))
    }
}
