use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(CaptureSource {
    Qr => "qr",
    Pdf417 => "pdf417",
    Manual => "manual",
});

str_enum!(AcquisitionPhase {
    Idle => "idle",
    Scanning => "scanning",
    Resolving => "resolving",
    Reviewing => "reviewing",
    Committing => "committing",
    Done => "done",
    ResolveFailed => "resolve_failed",
    CommitFailed => "commit_failed",
});

impl AcquisitionPhase {
    /// Phases in which a new capture is accepted.
    ///
    /// `Done` and both failure phases report the previous attempt's outcome
    /// but hand control back to the user, exactly like `Idle`.
    pub fn is_at_rest(&self) -> bool {
        matches!(
            self,
            Self::Idle | Self::Done | Self::ResolveFailed | Self::CommitFailed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_source_round_trips_through_str() {
        for source in [CaptureSource::Qr, CaptureSource::Pdf417, CaptureSource::Manual] {
            assert_eq!(source.as_str().parse::<CaptureSource>().unwrap(), source);
        }
    }

    #[test]
    fn unknown_capture_source_is_rejected() {
        let err = "barcode".parse::<CaptureSource>().unwrap_err();
        assert!(matches!(
            err,
            ModelError::InvalidEnum { ref field, ref value }
                if field == "CaptureSource" && value == "barcode"
        ));
    }

    #[test]
    fn serde_matches_as_str() {
        let json = serde_json::to_string(&AcquisitionPhase::ResolveFailed).unwrap();
        assert_eq!(json, "\"resolve_failed\"");
    }

    #[test]
    fn only_terminal_phases_are_at_rest() {
        assert!(AcquisitionPhase::Idle.is_at_rest());
        assert!(AcquisitionPhase::Done.is_at_rest());
        assert!(AcquisitionPhase::ResolveFailed.is_at_rest());
        assert!(AcquisitionPhase::CommitFailed.is_at_rest());
        assert!(!AcquisitionPhase::Scanning.is_at_rest());
        assert!(!AcquisitionPhase::Resolving.is_at_rest());
        assert!(!AcquisitionPhase::Reviewing.is_at_rest());
        assert!(!AcquisitionPhase::Committing.is_at_rest());
    }
}
