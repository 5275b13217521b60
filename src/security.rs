//! Per-port security level and operating mode.
//! Both are stored in the config file as small integers.

/// Encryption / certificate state of a port.
/// Declaration order is the on-disk code (0..=4) and the toggle order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SecurityLevel {
    #[default]
    None,
    DataOnly,
    DataOnlyCert,
    DataAndCommand,
    DataAndCommandCert,
}

impl SecurityLevel {
    pub const ALL: [SecurityLevel; 5] = [
        SecurityLevel::None,
        SecurityLevel::DataOnly,
        SecurityLevel::DataOnlyCert,
        SecurityLevel::DataAndCommand,
        SecurityLevel::DataAndCommandCert,
    ];

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Cyclic successor used by the per-port toggle.
    pub fn next(self) -> Self {
        match self {
            SecurityLevel::None => SecurityLevel::DataOnly,
            SecurityLevel::DataOnly => SecurityLevel::DataOnlyCert,
            SecurityLevel::DataOnlyCert => SecurityLevel::DataAndCommand,
            SecurityLevel::DataAndCommand => SecurityLevel::DataAndCommandCert,
            SecurityLevel::DataAndCommandCert => SecurityLevel::None,
        }
    }

    /// Turns on certificate authentication. Unencrypted ports stay unencrypted.
    pub fn with_cert(self) -> Self {
        match self {
            SecurityLevel::DataOnly => SecurityLevel::DataOnlyCert,
            SecurityLevel::DataAndCommand => SecurityLevel::DataAndCommandCert,
            other => other,
        }
    }

    pub fn without_cert(self) -> Self {
        match self {
            SecurityLevel::DataOnlyCert => SecurityLevel::DataOnly,
            SecurityLevel::DataAndCommandCert => SecurityLevel::DataAndCommand,
            other => other,
        }
    }

    pub fn has_cert(self) -> bool {
        matches!(self, SecurityLevel::DataOnlyCert | SecurityLevel::DataAndCommandCert)
    }

    /// Label for the "[Sec.]" column.
    pub fn encryption_label(self) -> &'static str {
        match self {
            SecurityLevel::None => "None",
            SecurityLevel::DataOnly | SecurityLevel::DataOnlyCert => "Data only",
            SecurityLevel::DataAndCommand | SecurityLevel::DataAndCommandCert => "Data & command",
        }
    }

    /// Label for the "[Cert.]" column.
    pub fn cert_label(self) -> &'static str {
        if self.has_cert() { "Enable" } else { "None" }
    }
}

impl std::fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Server-port mapping mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    RealCom,
    Redundant,
}

impl Mode {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Mode::RealCom),
            1 => Some(Mode::Redundant),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Mode::RealCom => 0,
            Mode::Redundant => 1,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_five_times_is_identity() {
        for level in SecurityLevel::ALL {
            let mut cur = level;
            for _ in 0..5 {
                cur = cur.next();
            }
            assert_eq!(cur, level);
        }
    }

    #[test]
    fn test_toggle_order() {
        let mut cur = SecurityLevel::None;
        let mut seen = vec![cur];
        for _ in 0..4 {
            cur = cur.next();
            seen.push(cur);
        }
        assert_eq!(seen, SecurityLevel::ALL.to_vec());
    }

    #[test]
    fn test_cert_enable_disable_are_inverses() {
        for level in [SecurityLevel::None, SecurityLevel::DataOnly, SecurityLevel::DataAndCommand] {
            assert_eq!(level.with_cert().without_cert(), level);
        }
        assert_eq!(SecurityLevel::None.with_cert(), SecurityLevel::None);
    }

    #[test]
    fn test_cert_ops_idempotent_at_target() {
        assert_eq!(SecurityLevel::DataOnlyCert.with_cert(), SecurityLevel::DataOnlyCert);
        assert_eq!(
            SecurityLevel::DataAndCommandCert.with_cert(),
            SecurityLevel::DataAndCommandCert
        );
        assert_eq!(SecurityLevel::DataOnly.without_cert(), SecurityLevel::DataOnly);
        assert_eq!(SecurityLevel::None.without_cert(), SecurityLevel::None);
    }

    #[test]
    fn test_codes() {
        for (i, level) in SecurityLevel::ALL.iter().enumerate() {
            assert_eq!(usize::from(level.code()), i);
            assert_eq!(SecurityLevel::from_code(level.code()), Some(*level));
        }
        assert_eq!(SecurityLevel::from_code(5), None);
        assert_eq!(Mode::from_code(1), Some(Mode::Redundant));
        assert_eq!(Mode::from_code(2), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(SecurityLevel::DataAndCommandCert.encryption_label(), "Data & command");
        assert_eq!(SecurityLevel::DataAndCommandCert.cert_label(), "Enable");
        assert_eq!(SecurityLevel::DataOnly.cert_label(), "None");
    }
}
