//! 多视频结果汇总 - 业务能力层
//!
//! 先求和再除，结果与完成顺序无关；转写和情绪序列按输入顺序拼接。

use crate::models::{AggregatedRecord, AnalysisRecord, BehavioralScores};

/// 保留两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 逐项求平均并保留两位小数；空输入返回全零
pub fn average_scores<'a, I>(scores: I) -> BehavioralScores
where
    I: IntoIterator<Item = &'a BehavioralScores>,
{
    let mut totals = [0.0f64; BehavioralScores::FIELD_COUNT];
    let mut count = 0usize;

    for item in scores {
        for (total, value) in totals.iter_mut().zip(item.values()) {
            *total += value;
        }
        count += 1;
    }

    if count == 0 {
        return BehavioralScores::default();
    }

    BehavioralScores::from_values(totals.map(|total| round2(total / count as f64)))
}

/// 汇总多条分析结果
pub fn aggregate(records: &[AnalysisRecord]) -> AggregatedRecord {
    let scores = average_scores(records.iter().map(|record| &record.scores));

    let emotion = records
        .iter()
        .flat_map(|record| record.emotion.iter().cloned())
        .collect();

    let transcripts: Vec<String> = records
        .iter()
        .filter(|record| record.has_transcript())
        .map(|record| record.transcript.clone())
        .collect();

    let combined_transcript = transcripts.join(" ");

    AggregatedRecord {
        scores,
        emotion,
        transcripts,
        combined_transcript,
    }
}
