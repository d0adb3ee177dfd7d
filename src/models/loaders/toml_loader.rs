use crate::error::CatalogError;
use crate::models::catalog::Catalog;
use crate::models::request::RequestSpec;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 加载科目目录
pub async fn load_catalog(catalog_path: &Path) -> Result<Catalog, CatalogError> {
    let path = catalog_path.display().to_string();

    let content = fs::read_to_string(catalog_path)
        .await
        .map_err(|source| CatalogError::ReadFailed { path: path.clone(), source })?;

    Catalog::from_toml_str(&content).map_err(|source| CatalogError::TomlParseFailed { path, source })
}

/// 从 TOML 文件加载单个生成请求
pub async fn load_toml_to_request(toml_file_path: &Path) -> Result<RequestSpec> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let spec: RequestSpec = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    Ok(spec.with_file_path(toml_file_path.to_string_lossy().to_string()))
}

/// 从文件夹中加载所有请求文件（按文件名排序）
pub async fn load_all_request_files(folder_path: &str) -> Result<Vec<RequestSpec>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }
    toml_files.sort();

    let mut requests = Vec::new();
    for path in toml_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_toml_to_request(&path).await {
            Ok(spec) => requests.push(spec),
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(requests)
}

/// 读取学习材料文本
pub async fn load_material(material_path: &Path) -> Result<String> {
    fs::read_to_string(material_path)
        .await
        .with_context(|| format!("无法读取学习材料: {}", material_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("quiz_generate_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_load_all_request_files_skips_broken_files() {
        let dir = temp_dir("requests");
        std::fs::write(dir.join("b.toml"), "subject_id = 2\nnum_questions = 5\n").unwrap();
        std::fs::write(dir.join("a.toml"), "config_id = 1\n").unwrap();
        std::fs::write(dir.join("broken.toml"), "subject_id = [").unwrap();
        std::fs::write(dir.join("notes.txt"), "not a request").unwrap();

        let requests = load_all_request_files(dir.to_str().unwrap()).await.unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].config_id, Some(1));
        assert_eq!(requests[1].subject_id, Some(2));
        assert!(requests[1].file_path.as_deref().unwrap().ends_with("b.toml"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_missing_folder_is_an_error() {
        assert!(load_all_request_files("/definitely/not/here").await.is_err());
    }

    #[tokio::test]
    async fn test_load_catalog_reports_path() {
        let dir = temp_dir("catalog");
        let path = dir.join("catalog.toml");
        std::fs::write(&path, "[[subjects]]\nid = \"x\"\n").unwrap();

        let err = load_catalog(&path).await.unwrap_err();
        assert!(matches!(err, CatalogError::TomlParseFailed { .. }));
        assert!(err.to_string().contains("catalog.toml"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
