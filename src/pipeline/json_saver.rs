use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

/// Timeout for blocking JSON serialization
const BLOCKING_SERIALIZATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Write `records` to `path` as a pretty-printed JSON array
///
/// Parent directories are created as needed.
pub async fn save_records<T: Serialize>(records: &[T], path: &Path) -> Result<()> {
    let value = serde_json::to_value(records).context("Failed to convert records to JSON")?;

    // Pretty printing a full run's records is CPU bound
    let blocking_task = tokio::task::spawn_blocking(move || serde_json::to_string_pretty(&value));

    let json = match timeout(BLOCKING_SERIALIZATION_TIMEOUT, blocking_task).await {
        Ok(Ok(result)) => result?,
        Ok(Err(e)) => return Err(anyhow::anyhow!("JSON serialization task panicked: {e}")),
        Err(_) => {
            log::warn!("JSON serialization timeout (timeout: {BLOCKING_SERIALIZATION_TIMEOUT:?})");
            return Err(anyhow::anyhow!(
                "JSON serialization timed out after {BLOCKING_SERIALIZATION_TIMEOUT:?}"
            ));
        }
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    log::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{FacilityRecord, Price, PricePeriod};

    #[tokio::test]
    async fn records_are_written_as_pretty_array() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("nested").join("listings.json");
        let records = vec![FacilityRecord {
            name: "ジム A".to_string(),
            area: "東京都".to_string(),
            prefecture: "東京都".to_string(),
            city: "渋谷区".to_string(),
            address: "東京都渋谷区神南1-2-3".to_string(),
            prices: vec![Price::new(PricePeriod::Monthly, 8800)],
            url: "https://fitmap.jp/gym/1/".to_string(),
            features: vec!["24時間".to_string()],
            description: None,
            region_id: 1,
        }];

        save_records(&records, &path).await.expect("save");

        let written = std::fs::read_to_string(&path).expect("read back");
        assert!(written.starts_with("[\n"));
        let parsed: Vec<FacilityRecord> = serde_json::from_str(&written).expect("parse");
        assert_eq!(parsed, records);
    }
}
