use std::path::Path;

use ekklesia_application::FormValues;
use ekklesia_core::{AppError, AppResult};
use ekklesia_domain::FormDefinition;
use serde::de::DeserializeOwned;
use tracing::info;

/// Reads a form definition snapshot from a JSON file.
pub async fn read_form_definition(path: &Path) -> AppResult<FormDefinition> {
    let definition: FormDefinition = read_json(path, "form definition").await?;
    info!(
        path = %path.display(),
        sections = definition.sections().len(),
        fields = definition.fields().len(),
        "loaded form definition"
    );
    Ok(definition)
}

/// Reads a flat value mapping from a JSON file.
pub async fn read_form_values(path: &Path) -> AppResult<FormValues> {
    read_json(path, "form values").await
}

async fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> AppResult<T> {
    let contents = tokio::fs::read_to_string(path).await.map_err(|error| {
        AppError::NotFound(format!("{what} file '{}': {error}", path.display()))
    })?;

    serde_json::from_str(&contents).map_err(|error| {
        AppError::Validation(format!(
            "{what} file '{}' is not valid JSON for this document: {error}",
            path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use ekklesia_core::AppError;
    use ekklesia_domain::{FieldType, FormLayout};
    use serde_json::json;
    use uuid::Uuid;

    use super::{read_form_definition, read_form_values};

    async fn write_temp(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("ekklesia-loader-{}.json", Uuid::new_v4()));
        tokio::fs::write(&path, contents)
            .await
            .unwrap_or_else(|_| unreachable!());
        path
    }

    #[tokio::test]
    async fn definition_snapshot_round_trips_from_disk() {
        let path = write_temp(
            r#"{
                "formLayout": "multi-section",
                "sections": [{ "id": "s1", "title": "Contact", "order": 0 }],
                "fields": [
                    {
                        "id": "email",
                        "label": "Email",
                        "type": "email",
                        "order": 0,
                        "sectionId": "s1"
                    }
                ]
            }"#,
        )
        .await;

        let definition = read_form_definition(&path)
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(definition.form_layout(), FormLayout::MultiSection);
        assert_eq!(
            definition.field("email").map(|field| field.field_type()),
            Some(FieldType::Email)
        );

        tokio::fs::remove_file(&path)
            .await
            .unwrap_or_else(|_| unreachable!());
    }

    #[tokio::test]
    async fn values_file_must_be_an_object() {
        let path = write_temp(r#"{ "name": "Grace", "guests": 2 }"#).await;
        let values = read_form_values(&path)
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(values.get("guests"), Some(&json!(2)));
        tokio::fs::remove_file(&path)
            .await
            .unwrap_or_else(|_| unreachable!());

        let path = write_temp("[1, 2]").await;
        assert!(matches!(
            read_form_values(&path).await,
            Err(AppError::Validation(_))
        ));
        tokio::fs::remove_file(&path)
            .await
            .unwrap_or_else(|_| unreachable!());
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let path = std::env::temp_dir().join(format!("ekklesia-missing-{}.json", Uuid::new_v4()));
        assert!(matches!(
            read_form_definition(&path).await,
            Err(AppError::NotFound(_))
        ));
    }
}
