//! 反馈生成 - 业务能力层
//!
//! 按固定阈值把六项行为得分翻译成优点、不足和建议。

use crate::models::{BehavioralScores, FeedbackReport};

const EYE_CONTACT_THRESHOLD: f64 = 0.7;
const SMILE_THRESHOLD: f64 = 0.7;
const CONFIDENCE_THRESHOLD: f64 = 0.75;
const POSTURE_THRESHOLD: f64 = 0.7;
const HAND_MOVEMENT_THRESHOLD: f64 = 0.6;
const HEAD_NOD_MINIMUM: f64 = 0.3;

/// 单项阈值规则
struct Rule {
    threshold: f64,
    strength: &'static str,
    weakness: &'static str,
    suggestion: &'static str,
}

/// 根据行为得分生成反馈
pub fn synthesize_feedback(scores: &BehavioralScores) -> FeedbackReport {
    let scores = scores.clamped();
    let mut report = FeedbackReport {
        overall_score: (scores.mean() * 100.0).round() as u32,
        confidence_score: scores.confidence,
        ..Default::default()
    };

    let rules = [
        (
            scores.eye_contact,
            Rule {
                threshold: EYE_CONTACT_THRESHOLD,
                strength: "Maintains good eye contact",
                weakness: "Poor eye contact",
                suggestion: "Try to maintain eye contact to build connection",
            },
        ),
        (
            scores.smile,
            Rule {
                threshold: SMILE_THRESHOLD,
                strength: "Friendly smile",
                weakness: "Rarely smiles",
                suggestion: "Smile occasionally to appear more approachable",
            },
        ),
        (
            scores.confidence,
            Rule {
                threshold: CONFIDENCE_THRESHOLD,
                strength: "Confident speaking",
                weakness: "Appears unsure while speaking",
                suggestion: "Work on projecting more confidence in speech",
            },
        ),
        (
            scores.posture,
            Rule {
                threshold: POSTURE_THRESHOLD,
                strength: "Professional posture",
                weakness: "Unsteady or slouched posture",
                suggestion: "Maintain upright posture for confidence",
            },
        ),
        (
            scores.hand_movement,
            Rule {
                threshold: HAND_MOVEMENT_THRESHOLD,
                strength: "Good hand gestures",
                weakness: "Limited hand gestures",
                suggestion: "Use expressive but controlled hand gestures",
            },
        ),
    ];

    for (value, rule) in rules {
        if value >= rule.threshold {
            report.strengths.push(rule.strength.to_string());
        } else {
            report.weaknesses.push(rule.weakness.to_string());
            report.suggestions.push(rule.suggestion.to_string());
        }
    }

    if scores.head_nod < HEAD_NOD_MINIMUM {
        report
            .suggestions
            .push("Nod occasionally to show engagement".to_string());
    }

    report.suggestions.push("Practice concise answers".to_string());
    report.suggestions.push("Maintain steady body posture".to_string());

    report
}
