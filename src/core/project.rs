//! # Project List / 项目列表
//!
//! A project list names the workbooks to aggregate together, each with its own
//! display identifier. Three formats are read:
//!
//! - `.json` / `.yaml` / `.yml`: `{ project: { project_name, files: [{ path, identifier }], last_loaded } }`
//! - `.txt`: one path per line; blank lines and `#` comments are skipped, and
//!   the identifier is the file stem
//!
//! After a run the structured formats get `project.last_loaded` set to the
//! current time. Every other key in the file is preserved.
//!
//! 项目列表列出需要一起聚合的工作簿，每个工作簿带有自己的显示标识。支持三种格式：
//! JSON / YAML 结构化格式，以及每行一个路径的文本格式（标识取文件名主干）。
//! 运行结束后，结构化格式中的 `project.last_loaded` 会被更新为当前时间，其他键保持不变。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::ProjectListError;
use crate::core::summary::FileInput;

/// Timestamp format written to `last_loaded`.
pub const LAST_LOADED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// On-disk format, chosen by extension.
/// 文件格式，按扩展名决定。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    Json,
    Yaml,
    Text,
}

impl ListFormat {
    pub fn from_path(path: &Path) -> Result<Self, ProjectListError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "json" => Ok(ListFormat::Json),
            "yaml" | "yml" => Ok(ListFormat::Yaml),
            "txt" => Ok(ListFormat::Text),
            _ => Err(ProjectListError::UnsupportedFormat { extension }),
        }
    }
}

/// One listed workbook.
/// 列表中的一个工作簿。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub path: PathBuf,
    pub identifier: String,
}

/// A parsed project list.
/// 解析后的项目列表。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectList {
    pub project_name: String,
    pub files: Vec<ProjectFile>,
    #[serde(default)]
    pub last_loaded: String,
}

#[derive(Debug, Deserialize)]
struct ProjectDocument {
    project: ProjectList,
}

impl ProjectList {
    /// Reads a project list, picking the format from the extension.
    ///
    /// # Errors / 错误
    /// Fails for unknown extensions, unreadable or malformed files, and lists
    /// without any file.
    /// 扩展名未知、文件无法读取或格式错误、列表不含任何文件时返回错误。
    pub fn load(path: &Path) -> Result<Self, ProjectListError> {
        let format = ListFormat::from_path(path)?;
        let content = fs::read_to_string(path).map_err(|source| ProjectListError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_error = |message: String| ProjectListError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let list = match format {
            ListFormat::Json => serde_json::from_str::<ProjectDocument>(&content)
                .map(|doc| doc.project)
                .map_err(|e| parse_error(e.to_string()))?,
            ListFormat::Yaml => serde_yaml::from_str::<ProjectDocument>(&content)
                .map(|doc| doc.project)
                .map_err(|e| parse_error(e.to_string()))?,
            ListFormat::Text => Self::from_text(&list_stem(path), &content),
        };

        if list.files.is_empty() {
            return Err(ProjectListError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(list)
    }

    /// Parses the plain-text format. Surrounding double quotes are stripped.
    /// 解析纯文本格式。会去掉包围路径的双引号。
    pub fn from_text(project_name: &str, content: &str) -> Self {
        let files = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| {
                let line = line
                    .strip_prefix('"')
                    .and_then(|rest| rest.strip_suffix('"'))
                    .unwrap_or(line);
                let path = PathBuf::from(line);
                ProjectFile {
                    identifier: list_stem(&path),
                    path,
                }
            })
            .collect();

        Self {
            project_name: project_name.to_string(),
            files,
            last_loaded: String::new(),
        }
    }

    /// Every listed file as an aggregation input carrying its identifier.
    /// 将列出的每个文件转换为带标识的聚合输入。
    pub fn inputs(&self) -> Vec<FileInput> {
        self.files
            .iter()
            .map(|file| FileInput::new(&file.path).with_identifier(&file.identifier))
            .collect()
    }
}

fn list_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Sets `project.last_loaded` to `timestamp` and writes the file back.
///
/// Returns `Ok(false)` for text lists, which carry no timestamp.
///
/// 将 `project.last_loaded` 设置为 `timestamp` 并写回文件。文本格式的列表没有时间戳，返回 `Ok(false)`。
pub fn update_last_loaded(path: &Path, timestamp: &str) -> Result<bool, ProjectListError> {
    let format = ListFormat::from_path(path)?;
    if format == ListFormat::Text {
        return Ok(false);
    }

    let content = fs::read_to_string(path).map_err(|source| ProjectListError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_error = |message: String| ProjectListError::Parse {
        path: path.to_path_buf(),
        message,
    };
    let missing_project = || parse_error("missing 'project' mapping".to_string());

    let updated = match format {
        ListFormat::Json => {
            let mut value: serde_json::Value =
                serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?;
            let project = value
                .get_mut("project")
                .and_then(serde_json::Value::as_object_mut)
                .ok_or_else(missing_project)?;
            project.insert(
                "last_loaded".to_string(),
                serde_json::Value::String(timestamp.to_string()),
            );
            serde_json::to_string_pretty(&value).map_err(|e| parse_error(e.to_string()))?
        }
        ListFormat::Yaml => {
            let mut value: serde_yaml::Value =
                serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string()))?;
            let project = value
                .get_mut("project")
                .and_then(serde_yaml::Value::as_mapping_mut)
                .ok_or_else(missing_project)?;
            project.insert(
                serde_yaml::Value::String("last_loaded".to_string()),
                serde_yaml::Value::String(timestamp.to_string()),
            );
            serde_yaml::to_string(&value).map_err(|e| parse_error(e.to_string()))?
        }
        ListFormat::Text => return Ok(false),
    };

    fs::write(path, updated).map_err(|source| ProjectListError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}
