//! Station codes and display names.

use std::fmt;
use std::str::FromStr;

/// Error returned when a name or code matches no station.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown station: {0:?}")]
pub struct UnknownStation(pub String);

/// A station on the Taiwan High Speed Rail line, north to south.
///
/// The code is the identifier the timetable endpoint expects in its
/// `StartStation` / `EndStation` form fields.
///
/// # Examples
///
/// ```
/// use tool_server::stations::Station;
///
/// assert_eq!(Station::resolve("TaiPei").unwrap(), Station::TaiPei);
/// assert_eq!(Station::resolve("台北").unwrap(), Station::TaiPei);
/// assert_eq!(Station::TaiZhong.display_name(), "台中");
/// assert!(Station::resolve("Tokyo").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Station {
    NanGang,
    TaiPei,
    BanQiao,
    TaoYuan,
    XinZhu,
    MiaoLi,
    TaiZhong,
    ZhangHua,
    YunLin,
    JiaYi,
    TaiNan,
    ZuoYing,
}

/// Extra display names accepted on lookup. Zuoying is the Kaohsiung stop.
const ALIASES: &[(&str, Station)] = &[("高雄", Station::ZuoYing)];

impl Station {
    /// Every station in line order.
    pub const ALL: [Station; 12] = [
        Station::NanGang,
        Station::TaiPei,
        Station::BanQiao,
        Station::TaoYuan,
        Station::XinZhu,
        Station::MiaoLi,
        Station::TaiZhong,
        Station::ZhangHua,
        Station::YunLin,
        Station::JiaYi,
        Station::TaiNan,
        Station::ZuoYing,
    ];

    /// Returns the station code, e.g. `"TaiPei"`.
    pub fn code(self) -> &'static str {
        match self {
            Station::NanGang => "NanGang",
            Station::TaiPei => "TaiPei",
            Station::BanQiao => "BanQiao",
            Station::TaoYuan => "TaoYuan",
            Station::XinZhu => "XinZhu",
            Station::MiaoLi => "MiaoLi",
            Station::TaiZhong => "TaiZhong",
            Station::ZhangHua => "ZhangHua",
            Station::YunLin => "YunLin",
            Station::JiaYi => "JiaYi",
            Station::TaiNan => "TaiNan",
            Station::ZuoYing => "ZuoYing",
        }
    }

    /// Returns the Chinese display name, e.g. `"台北"`.
    pub fn display_name(self) -> &'static str {
        match self {
            Station::NanGang => "南港",
            Station::TaiPei => "台北",
            Station::BanQiao => "板橋",
            Station::TaoYuan => "桃園",
            Station::XinZhu => "新竹",
            Station::MiaoLi => "苗栗",
            Station::TaiZhong => "台中",
            Station::ZhangHua => "彰化",
            Station::YunLin => "雲林",
            Station::JiaYi => "嘉義",
            Station::TaiNan => "台南",
            Station::ZuoYing => "左營",
        }
    }

    /// Resolve a station from either its code or its display name.
    ///
    /// Codes match ignoring ASCII case. Display names match exactly after
    /// the traditional `臺` is folded to `台`, so `臺北` finds Taipei.
    pub fn resolve(query: &str) -> Result<Self, UnknownStation> {
        let query = query.trim();
        if query.is_empty() {
            return Err(UnknownStation(query.to_string()));
        }

        if let Some(station) = Self::ALL
            .iter()
            .find(|s| s.code().eq_ignore_ascii_case(query))
        {
            return Ok(*station);
        }

        let folded = query.replace('臺', "台");
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.display_name() == folded)
            .or_else(|| {
                ALIASES
                    .iter()
                    .find(|(name, _)| *name == folded)
                    .map(|(_, station)| *station)
            })
            .ok_or_else(|| UnknownStation(query.to_string()))
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Station {
    type Err = UnknownStation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_by_code() {
        assert_eq!(Station::resolve("NanGang").unwrap(), Station::NanGang);
        assert_eq!(Station::resolve("ZuoYing").unwrap(), Station::ZuoYing);
    }

    #[test]
    fn resolve_by_display_name() {
        assert_eq!(Station::resolve("台中").unwrap(), Station::TaiZhong);
        assert_eq!(Station::resolve("嘉義").unwrap(), Station::JiaYi);
    }

    #[test]
    fn code_match_ignores_ascii_case() {
        assert_eq!(Station::resolve("taipei").unwrap(), Station::TaiPei);
        assert_eq!(Station::resolve("TAIZHONG").unwrap(), Station::TaiZhong);
    }

    #[test]
    fn traditional_tai_is_folded() {
        assert_eq!(Station::resolve("臺北").unwrap(), Station::TaiPei);
        assert_eq!(Station::resolve("臺南").unwrap(), Station::TaiNan);
    }

    #[test]
    fn kaohsiung_alias_resolves_to_zuoying() {
        assert_eq!(Station::resolve("高雄").unwrap(), Station::ZuoYing);
        assert_eq!(Station::resolve("左營").unwrap(), Station::ZuoYing);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(Station::resolve("  新竹 ").unwrap(), Station::XinZhu);
    }

    #[test]
    fn unknown_names_fail() {
        assert_eq!(
            Station::resolve("Tokyo"),
            Err(UnknownStation("Tokyo".to_string()))
        );
        assert!(Station::resolve("").is_err());
        assert!(Station::resolve("台").is_err());
    }

    #[test]
    fn display_is_code() {
        assert_eq!(Station::BanQiao.to_string(), "BanQiao");
        assert_eq!("苗栗".parse::<Station>().unwrap(), Station::MiaoLi);
    }
}
