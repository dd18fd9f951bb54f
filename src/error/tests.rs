//! Tests for error handling system

#[cfg(test)]
mod tests {
    use super::super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_error_severity() {
        assert_eq!(
            ModGraphError::PermissionDenied { path: PathBuf::from("test") }.severity(),
            ErrorSeverity::Warning
        );

        assert_eq!(
            ModGraphError::Io {
                source: io::Error::new(io::ErrorKind::NotFound, "not found"),
            }
            .severity(),
            ErrorSeverity::Error
        );

        assert_eq!(
            ModGraphError::Config { message: "Invalid config".to_string() }.severity(),
            ErrorSeverity::Critical
        );
    }

    #[test]
    fn test_sequence_errors_are_critical() {
        for err in [
            ModGraphError::NotScanned,
            ModGraphError::GraphNotBuilt,
            ModGraphError::VersionsNotLoaded { missing: "source" },
        ] {
            assert_eq!(err.severity(), ErrorSeverity::Critical);
        }
    }

    #[test]
    fn test_user_message() {
        let err = ModGraphError::PermissionDenied { path: PathBuf::from("/test/path") };
        let msg = err.user_message();
        assert!(msg.contains("/test/path"));
        assert!(msg.contains("permission denied"));

        let err = ModGraphError::ModuleNotFound { name: "sale_ext".to_string() };
        assert!(err.user_message().contains("sale_ext"));

        // Variants without a dedicated message fall back to Display
        let err = ModGraphError::GraphNotBuilt;
        assert_eq!(err.user_message(), err.to_string());
    }

    #[test]
    fn test_error_factory_methods() {
        match ModGraphError::io_error(io::Error::new(io::ErrorKind::NotFound, "not found")) {
            ModGraphError::Io { source } => assert_eq!(source.kind(), io::ErrorKind::NotFound),
            other => panic!("Expected Io error, got {:?}", other),
        }

        match ModGraphError::config_error("Invalid config") {
            ModGraphError::Config { message } => assert_eq!(message, "Invalid config"),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }
}
