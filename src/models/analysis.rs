use serde::{Deserialize, Serialize};

/// 六项行为信号得分，每项都在 [0.0, 1.0] 内
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BehavioralScores {
    #[serde(default)]
    pub eye_contact: f64,
    #[serde(default)]
    pub smile: f64,
    #[serde(default)]
    pub posture: f64,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub hand_movement: f64,
    #[serde(default)]
    pub head_nod: f64,
}

impl BehavioralScores {
    pub const FIELD_COUNT: usize = 6;

    /// 按固定顺序返回六项得分
    pub fn values(&self) -> [f64; Self::FIELD_COUNT] {
        [
            self.eye_contact,
            self.smile,
            self.posture,
            self.confidence,
            self.hand_movement,
            self.head_nod,
        ]
    }

    /// 与 [`values`](Self::values) 顺序相同的构造
    pub fn from_values(values: [f64; Self::FIELD_COUNT]) -> Self {
        let [eye_contact, smile, posture, confidence, hand_movement, head_nod] = values;
        Self {
            eye_contact,
            smile,
            posture,
            confidence,
            hand_movement,
            head_nod,
        }
    }

    /// 把分析器给出的值收敛到 [0, 1]，非有限值记为 0
    pub fn clamped(self) -> Self {
        Self::from_values(self.values().map(|v| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }))
    }

    /// 六项得分的算术平均
    pub fn mean(&self) -> f64 {
        self.values().iter().sum::<f64>() / Self::FIELD_COUNT as f64
    }
}

/// 单个视频的分析结果
///
/// 由单视频流程产出，之后不再修改。`error` 只在某个阶段降级或整体失败时出现。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// 逐帧情绪标签
    pub emotion: Vec<String>,
    /// 语音转写文本；空字符串表示没有识别到语音（也可能是转写失败）
    pub transcript: String,
    #[serde(flatten)]
    pub scores: BehavioralScores,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisRecord {
    /// 全零的占位记录，用于失败响应
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn has_transcript(&self) -> bool {
        !self.transcript.is_empty()
    }
}

/// 多个视频分析结果的汇总
///
/// 标量字段为各记录的平均值（保留两位小数），转写和情绪序列按提交顺序拼接。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregatedRecord {
    #[serde(flatten)]
    pub scores: BehavioralScores,
    pub emotion: Vec<String>,
    pub transcripts: Vec<String>,
    pub combined_transcript: String,
}

impl AggregatedRecord {
    /// 转换回单条记录，便于再次汇总
    pub fn to_record(&self) -> AnalysisRecord {
        AnalysisRecord {
            emotion: self.emotion.clone(),
            transcript: self.combined_transcript.clone(),
            scores: self.scores,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_bounds_out_of_range_scores() {
        let scores = BehavioralScores {
            eye_contact: 1.4,
            smile: -0.2,
            posture: f64::NAN,
            confidence: 0.5,
            hand_movement: f64::INFINITY,
            head_nod: 0.3,
        }
        .clamped();

        assert_eq!(scores.values(), [1.0, 0.0, 0.0, 0.5, 0.0, 0.3]);
    }

    #[test]
    fn record_serializes_flat_score_fields() {
        let record = AnalysisRecord {
            emotion: vec!["Happy".to_string()],
            transcript: "hello".to_string(),
            scores: BehavioralScores {
                eye_contact: 0.5,
                ..Default::default()
            },
            error: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["eye_contact"], 0.5);
        assert_eq!(json["transcript"], "hello");
        assert!(json.get("scores").is_none());
        assert!(json.get("error").is_none());
    }
}
