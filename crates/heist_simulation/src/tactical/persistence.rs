//! Файл точек карты: `<dir>/<map>.json`, упорядоченный массив `[x, y, z]`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bevy::math::Vec3;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PointFileError {
    #[error("point file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("point file {path} is malformed: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Путь файла карты; разделители пути в имени карты заменяются на `_`
pub fn point_file_path(dir: &Path, map_name: &str) -> PathBuf {
    let file_name: String = map_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    dir.join(format!("{}.json", file_name))
}

pub fn save_points(dir: &Path, map_name: &str, positions: &[Vec3]) -> Result<PathBuf, PointFileError> {
    let path = point_file_path(dir, map_name);

    fs::create_dir_all(dir).map_err(|source| PointFileError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let raw: Vec<[f32; 3]> = positions.iter().map(|p| p.to_array()).collect();
    let json = serde_json::to_string_pretty(&raw).map_err(|source| PointFileError::Format {
        path: path.clone(),
        source,
    })?;

    fs::write(&path, json).map_err(|source| PointFileError::Io {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

pub fn load_points(dir: &Path, map_name: &str) -> Result<Vec<Vec3>, PointFileError> {
    let path = point_file_path(dir, map_name);

    let json = fs::read_to_string(&path).map_err(|source| PointFileError::Io {
        path: path.clone(),
        source,
    })?;
    let raw: Vec<[f32; 3]> =
        serde_json::from_str(&json).map_err(|source| PointFileError::Format { path, source })?;

    Ok(raw.into_iter().map(Vec3::from_array).collect())
}
