use crate::models::manifest::InterviewManifest;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载任务清单
///
/// 清单中的相对视频路径按清单文件所在目录解析。
pub async fn load_manifest(toml_file_path: &Path) -> Result<InterviewManifest> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let mut manifest: InterviewManifest = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    if let Some(base) = toml_file_path.parent() {
        for video in manifest.videos.iter_mut() {
            if video.is_relative() {
                *video = base.join(&*video);
            }
        }
    }

    tracing::info!(
        "成功加载清单 {}: {} 个视频",
        toml_file_path.display(),
        manifest.videos.len()
    );

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::manifest::RunMode;

    #[tokio::test]
    async fn loads_manifest_and_resolves_relative_videos() {
        let dir = std::env::temp_dir().join(format!("manifest_test_{}", uuid::Uuid::new_v4().simple()));
        fs::create_dir_all(&dir).await.unwrap();
        let manifest_path = dir.join("interview.toml");
        fs::write(
            &manifest_path,
            r#"
question = "What is ownership?"
question_index = 3
videos = ["a.mp4", "/abs/b.mp4"]
"#,
        )
        .await
        .unwrap();

        let manifest = load_manifest(&manifest_path).await.unwrap();
        fs::remove_dir_all(&dir).await.unwrap();

        assert_eq!(manifest.question, "What is ownership?");
        assert_eq!(manifest.question_index, 3);
        assert_eq!(manifest.videos[0], dir.join("a.mp4"));
        assert_eq!(manifest.videos[1], Path::new("/abs/b.mp4"));
        assert_eq!(manifest.resolved_mode(), RunMode::Batch);
    }

    #[tokio::test]
    async fn feedback_manifest_reads_score_tables() {
        let dir = std::env::temp_dir().join(format!("manifest_test_{}", uuid::Uuid::new_v4().simple()));
        fs::create_dir_all(&dir).await.unwrap();
        let manifest_path = dir.join("feedback.toml");
        fs::write(
            &manifest_path,
            r#"
mode = "feedback"

[[results]]
eye_contact = 0.8
smile = 0.4
posture = 0.7
confidence = 0.9
hand_movement = 0.6
head_nod = 0.2
"#,
        )
        .await
        .unwrap();

        let manifest = load_manifest(&manifest_path).await.unwrap();
        fs::remove_dir_all(&dir).await.unwrap();

        assert_eq!(manifest.resolved_mode(), RunMode::Feedback);
        assert_eq!(manifest.results.len(), 1);
        assert_eq!(manifest.results[0].confidence, 0.9);
    }

    #[tokio::test]
    async fn questions_manifest_reads_resume_and_jd() {
        let dir = std::env::temp_dir().join(format!("manifest_test_{}", uuid::Uuid::new_v4().simple()));
        fs::create_dir_all(&dir).await.unwrap();
        let manifest_path = dir.join("questions.toml");
        fs::write(
            &manifest_path,
            r#"
mode = "questions"
resume = "Five years of Rust and Postgres"
jd = "Backend engineer"
"#,
        )
        .await
        .unwrap();

        let manifest = load_manifest(&manifest_path).await.unwrap();
        fs::remove_dir_all(&dir).await.unwrap();

        assert_eq!(manifest.resolved_mode(), RunMode::Questions);
        assert_eq!(manifest.resume, "Five years of Rust and Postgres");
        assert_eq!(manifest.jd, "Backend engineer");
        assert!(manifest.videos.is_empty());
    }
}
