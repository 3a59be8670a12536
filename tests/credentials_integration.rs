use docai_extract::document_ai::credentials::{
    ACCESS_TOKEN_ENV, CREDENTIALS_ENV, CredentialsProvider, resolve_ambient,
};
use docai_extract::document_ai::{DocumentAiProcessor, ProcessingError, ProcessorSettings};
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn clear_env_vars() {
    unsafe {
        env::remove_var(CREDENTIALS_ENV);
        env::remove_var(ACCESS_TOKEN_ENV);
    }
}

// Keep the real gcloud config of the machine out of the way
fn isolate_gcloud_config(dir: &TempDir) {
    unsafe {
        env::set_var("CLOUDSDK_CONFIG", dir.path());
    }
}

#[tokio::test]
#[serial]
async fn test_access_token_from_environment() {
    clear_env_vars();
    let gcloud = TempDir::new().unwrap();
    isolate_gcloud_config(&gcloud);
    unsafe {
        env::set_var(ACCESS_TOKEN_ENV, " ya29.from-env \n");
    }

    let provider = resolve_ambient().unwrap();
    assert_eq!(provider.provider_name(), "Static token");
    assert_eq!(provider.access_token().await.unwrap(), "ya29.from-env");

    clear_env_vars();
}

#[test]
#[serial]
fn test_credentials_file_from_environment() {
    clear_env_vars();
    let gcloud = TempDir::new().unwrap();
    isolate_gcloud_config(&gcloud);

    let mut key = NamedTempFile::with_suffix(".json").unwrap();
    write!(
        key,
        r#"{{"type":"authorized_user","client_id":"id","client_secret":"s","refresh_token":"r"}}"#
    )
    .unwrap();
    unsafe {
        env::set_var(CREDENTIALS_ENV, key.path());
        // The key file takes priority over a bare token
        env::set_var(ACCESS_TOKEN_ENV, "ya29.ignored");
    }

    let provider = resolve_ambient().unwrap();
    assert_eq!(provider.provider_name(), "Authorized user");

    let processor =
        DocumentAiProcessor::new(ProcessorSettings::new("project", "eu", "abc123")).unwrap();
    assert_eq!(
        processor.processor_name(),
        "projects/project/locations/eu/processors/abc123"
    );

    clear_env_vars();
}

#[test]
#[serial]
fn test_gcloud_default_credentials_file() {
    clear_env_vars();
    let gcloud = TempDir::new().unwrap();
    isolate_gcloud_config(&gcloud);
    std::fs::write(
        gcloud.path().join("application_default_credentials.json"),
        r#"{"type":"authorized_user","client_id":"id","client_secret":"s","refresh_token":"r"}"#,
    )
    .unwrap();

    let provider = resolve_ambient().unwrap();
    assert_eq!(provider.provider_name(), "Authorized user");
}

#[test]
#[serial]
fn test_no_credentials_available() {
    clear_env_vars();
    let gcloud = TempDir::new().unwrap();
    isolate_gcloud_config(&gcloud);

    let err = DocumentAiProcessor::new(ProcessorSettings::new("project", "us", "abc123"))
        .unwrap_err();
    assert!(matches!(
        err,
        ProcessingError::Configuration(msg) if msg.starts_with("No credentials found")
    ));
}
