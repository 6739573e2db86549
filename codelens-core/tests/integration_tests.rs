//! Integration tests for codelens-core infrastructure

use codelens_core::{
    acquisition_error, config_error, retry_async, validation_error, with_timeout,
    AcquisitionFailure, CodelensConfig, CodelensError, Dependency, DependencyKind, ErrorContext,
    NodeKind, RetryConfig, TreeNode,
};
use futures::FutureExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

fn quick_retry(max_attempts: usize) -> RetryConfig {
    RetryConfig {
        max_attempts,
        initial_delay_ms: 5,
        max_delay_ms: 20,
        backoff_multiplier: 2.0,
        jitter: false,
    }
}

#[tokio::test]
async fn test_error_handling() {
    let error = acquisition_error!(
        AcquisitionFailure::BranchNotFound,
        "Remote branch nope not found",
        "test_component"
    );

    match &error {
        CodelensError::Acquisition {
            kind,
            message,
            context,
            ..
        } => {
            assert_eq!(*kind, AcquisitionFailure::BranchNotFound);
            assert_eq!(message, "Remote branch nope not found");
            assert_eq!(context.component, "test_component");
            assert!(!context.error_id.is_empty());
        }
        _ => panic!("Expected Acquisition error"),
    }

    // Should not panic
    error.log();
    assert!(!error.is_recoverable());
    assert_eq!(error.acquisition_failure(), Some(AcquisitionFailure::BranchNotFound));

    let network_error = CodelensError::Acquisition {
        kind: AcquisitionFailure::Network,
        message: "Connection reset".to_string(),
        source: None,
        context: ErrorContext::new("test"),
    };
    assert!(network_error.is_recoverable());
    assert_eq!(network_error.context().component, "test");

    let config_error = config_error!("Invalid config", "test");
    assert!(!config_error.is_recoverable());
    assert!(!config_error.context().recovery_suggestions.is_empty());
    assert!(config_error.acquisition_failure().is_none());
}

#[tokio::test]
async fn test_error_display_names_the_failure_kind() {
    let error = acquisition_error!(
        AcquisitionFailure::SizeLimitExceeded,
        "workspace is 12 MB, limit is 10 MB",
        "acquirer"
    );
    assert_eq!(
        error.to_string(),
        "Acquisition error (size limit exceeded): workspace is 12 MB, limit is 10 MB"
    );
}

#[tokio::test]
async fn test_retry_mechanism() {
    let attempt_count = Arc::new(AtomicUsize::new(0));

    let operation = {
        let attempt_count = Arc::clone(&attempt_count);
        move || {
            let count = attempt_count.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if count < 3 {
                    Err(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        "Temporary failure",
                    ))
                } else {
                    Ok("Success")
                }
            }
            .boxed()
        }
    };

    let result = retry_async(operation, quick_retry(5), "test_operation", |_| true).await;
    assert_eq!(result.unwrap(), "Success");
    assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_stops_on_permanent_error() {
    let attempt_count = Arc::new(AtomicUsize::new(0));

    let operation = {
        let attempt_count = Arc::clone(&attempt_count);
        move || {
            attempt_count.fetch_add(1, Ordering::SeqCst);
            async move {
                Err::<(), Box<CodelensError>>(Box::new(acquisition_error!(
                    AcquisitionFailure::Auth,
                    "Authentication failed",
                    "test"
                )))
            }
            .boxed()
        }
    };

    let result = retry_async(operation, quick_retry(5), "acquire", |e| e.is_recoverable()).await;
    assert!(result.is_err());
    assert_eq!(attempt_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_timeout_mechanism() {
    let quick_operation = async {
        sleep(Duration::from_millis(10)).await;
        "Success"
    };

    let result = with_timeout(quick_operation, 200, "quick_test").await;
    assert_eq!(result.unwrap(), "Success");

    let slow_operation = async {
        sleep(Duration::from_millis(200)).await;
        "Should not reach here"
    };

    let result = with_timeout(slow_operation, 20, "slow_test").await;
    let error = result.unwrap_err();
    assert_eq!(error.acquisition_failure(), Some(AcquisitionFailure::Network));

    match *error {
        CodelensError::Timeout {
            operation,
            duration_ms,
            ..
        } => {
            assert_eq!(operation, "slow_test");
            assert_eq!(duration_ms, 20);
        }
        _ => panic!("Expected Timeout error"),
    }
}

#[tokio::test]
async fn test_config_validation() {
    let mut config = CodelensConfig::default();
    assert!(config.validate().is_ok());

    config.analysis.unknown_language = String::new();
    let result = config.validate();

    match *result.unwrap_err() {
        CodelensError::Config { message, .. } => {
            assert!(message.contains("unknown_language"));
        }
        _ => panic!("Expected Config error"),
    }
}

#[tokio::test]
async fn test_validation_macro() {
    match validation_error!("Repository URL must not be empty", "repo_url", "acquirer") {
        CodelensError::Validation {
            message,
            field,
            context,
        } => {
            assert_eq!(message, "Repository URL must not be empty");
            assert_eq!(field, Some("repo_url".to_string()));
            assert_eq!(context.component, "acquirer");
            assert!(!context.recovery_suggestions.is_empty());
        }
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_dependency_without_version_is_unknown() {
    let dep = Dependency::new("requests", None, DependencyKind::Production, "python");
    assert_eq!(dep.version, "unknown");

    let dep = Dependency::new("flask", Some(String::new()), DependencyKind::Production, "python");
    assert_eq!(dep.version, "unknown");
}

#[test]
fn test_tree_node_serialization_omits_empty_fields() {
    let tree = TreeNode {
        name: "repo".to_string(),
        path: ".".to_string(),
        kind: NodeKind::Directory,
        language: None,
        size: None,
        children: vec![TreeNode {
            name: "main.rs".to_string(),
            path: "main.rs".to_string(),
            kind: NodeKind::File,
            language: Some("rust".to_string()),
            size: Some(12),
            children: vec![],
        }],
    };

    let json = serde_json::to_value(&tree).unwrap();
    assert_eq!(json["type"], "directory");
    assert!(json.get("language").is_none());
    assert_eq!(json["children"][0]["type"], "file");
    assert_eq!(json["children"][0]["language"], "rust");
    assert!(json["children"][0].get("children").is_none());

    assert_eq!(tree.file_count(), 1);
    let names: Vec<&str> = tree.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["repo", "main.rs"]);
}
