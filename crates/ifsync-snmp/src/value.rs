// ── Decoded varbind values ──

/// A decoded SNMP value, reduced to the shapes the engine consumes.
///
/// Anything the transport cannot map onto these (counters, ticks,
/// opaque blobs) is carried as `Str` of its rendered form; the resolver
/// only ever needs integers and strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnmpValue {
    Int(i64),
    Str(String),
    Bytes(Vec<u8>),
    Null,
}

impl SnmpValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// String content, only when it is pure ASCII. Serial candidates
    /// are filtered through this: some agents return binary garbage in
    /// entPhysicalSerialNum and those rows must be dropped.
    pub fn as_ascii_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) if s.is_ascii() => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for SnmpValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<i64> for SnmpValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

#[cfg(test)]
mod tests {
    use super::SnmpValue;

    #[test]
    fn as_int_parses_numeric_strings() {
        assert_eq!(SnmpValue::Int(6).as_int(), Some(6));
        assert_eq!(SnmpValue::Str("24".into()).as_int(), Some(24));
        assert_eq!(SnmpValue::Str("eth0".into()).as_int(), None);
    }

    #[test]
    fn ascii_filter_drops_non_ascii_serials() {
        assert_eq!(
            SnmpValue::Str("1A2B3C".into()).as_ascii_str(),
            Some("1A2B3C")
        );
        assert_eq!(SnmpValue::Str("sn\u{fffd}01".into()).as_ascii_str(), None);
        assert_eq!(SnmpValue::Bytes(vec![0x8f]).as_ascii_str(), None);
    }
}
