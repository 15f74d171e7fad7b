//! crates/interview_core/src/scoring.rs
//!
//! Pure answer-quality analysis: the server-side scoring formulas, the
//! length-based tier heuristic used as the degraded-mode substitute, and the
//! SVG rendering for glyph artifacts.

use crate::domain::{Glyph, QualityTier};

/// Phrases that indicate the answer contains a concrete example.
const EXAMPLE_MARKERS: &[&str] = &["for example", "for instance", "example", "case", "situation"];

/// Phrases that indicate the answer commits to specifics.
const SPECIFIC_MARKERS: &[&str] = &["specifically", "exactly", "precisely", "concretely"];

/// Per-answer metrics and the derived 0-100 quality score.
#[derive(Debug, Clone)]
pub struct AnswerAnalysis {
    pub score: u8,
    pub word_count: usize,
    pub sentence_count: usize,
    pub keyword_matches: usize,
    pub has_examples: bool,
    pub has_specifics: bool,
}

/// Scores a single answer against the question's keywords.
///
/// The formula: up to 30 points for length (10/20/50 word bands), up to 30 for
/// keyword relevance, 15 for examples, 10 for specifics, up to 10 for sentence
/// structure. Answers under five words are capped at 10.
pub fn analyze_answer(text: &str, keywords: &[String]) -> AnswerAnalysis {
    let lower = text.to_lowercase();
    let word_count = text.split_whitespace().count();
    let sentence_count = text.split('.').filter(|s| !s.trim().is_empty()).count();

    let keyword_matches = keywords
        .iter()
        .filter(|k| lower.contains(&k.to_lowercase()))
        .count();
    let keyword_ratio = if keywords.is_empty() {
        0.0
    } else {
        keyword_matches as f32 / keywords.len() as f32
    };

    let has_examples = EXAMPLE_MARKERS.iter().any(|m| lower.contains(m));
    let has_specifics = SPECIFIC_MARKERS.iter().any(|m| lower.contains(m));

    let mut score: f32 = 0.0;

    score += match word_count {
        n if n >= 50 => 30.0,
        n if n >= 20 => 20.0,
        n if n >= 10 => 10.0,
        _ => 0.0,
    };

    if keywords.is_empty() {
        // No keywords to match against; reward length instead.
        score += (word_count as f32).min(30.0);
    } else {
        score += (keyword_ratio * 100.0).min(30.0);
    }

    if has_examples {
        score += 15.0;
    }
    if has_specifics {
        score += 10.0;
    }

    score += match sentence_count {
        n if n >= 3 => 10.0,
        2 => 5.0,
        _ => 0.0,
    };

    if word_count < 5 {
        score = score.min(10.0);
    }

    AnswerAnalysis {
        score: score.clamp(0.0, 100.0) as u8,
        word_count,
        sentence_count,
        keyword_matches,
        has_examples,
        has_specifics,
    }
}

/// Mean answer quality plus a completion bonus (answered/total, worth up to
/// 20 points), clamped to 0-100.
pub fn performance_score(analyses: &[AnswerAnalysis], total_questions: usize) -> u8 {
    if analyses.is_empty() || total_questions == 0 {
        return 0;
    }
    let avg: f32 =
        analyses.iter().map(|a| a.score as f32).sum::<f32>() / analyses.len() as f32;
    let completion_bonus = (analyses.len() as f32 / total_questions as f32) * 20.0;
    (avg + completion_bonus).clamp(0.0, 100.0) as u8
}

/// Composes the human-readable analysis text from the per-answer scores.
pub fn compose_summary(
    analyses: &[AnswerAnalysis],
    total_questions: usize,
    total_time_seconds: u64,
) -> String {
    let answered = analyses.len();
    if answered == 0 {
        return "The interview has only just begun. Answer the questions to receive a \
                detailed analysis."
            .to_string();
    }

    let avg_quality: f32 =
        analyses.iter().map(|a| a.score as f32).sum::<f32>() / answered as f32;
    let score = performance_score(analyses, total_questions);
    let with_examples = analyses.iter().filter(|a| a.has_examples).count();
    let minutes = total_time_seconds / 60;

    let (quality_level, recommendation) = if avg_quality >= 80.0 {
        ("Outstanding", "Strongly recommended for hire")
    } else if avg_quality >= 65.0 {
        ("Excellent", "Recommended for hire")
    } else if avg_quality >= 50.0 {
        ("Good", "Suitable for consideration")
    } else {
        ("Basic", "A follow-up interview is advised")
    };

    format!(
        "Interview analysis\n\
         \n\
         Overall statistics:\n\
         - Answered {answered} of {total_questions} questions ({:.1}%)\n\
         - Total interview time: {minutes} minutes\n\
         - Final score: {score}/100\n\
         \n\
         Answer quality:\n\
         - Quality level: {quality_level}\n\
         - Average quality score: {avg_quality:.1}/100\n\
         - Answers containing examples: {with_examples}/{answered}\n\
         \n\
         Assessment: {recommendation}.",
        answered as f32 / total_questions as f32 * 100.0,
    )
}

/// Fraction thresholds for the degraded-mode tier heuristic: answers of
/// length <= 3 are "very short", answers of length < 10 are "short".
/// More than half very short -> Limited; more than 30% short -> Fair;
/// everything else -> Excellent. An empty answer set classifies as Limited.
pub fn classify_tier<'a, I>(answers: I) -> QualityTier
where
    I: IntoIterator<Item = &'a str>,
{
    let mut total = 0usize;
    let mut very_short = 0usize;
    let mut short = 0usize;
    for answer in answers {
        let len = answer.chars().count();
        total += 1;
        if len <= 3 {
            very_short += 1;
        }
        if len < 10 {
            short += 1;
        }
    }
    if total == 0 {
        return QualityTier::Limited;
    }
    if very_short as f32 / total as f32 > 0.5 {
        QualityTier::Limited
    } else if short as f32 / total as f32 > 0.3 {
        QualityTier::Fair
    } else {
        QualityTier::Excellent
    }
}

/// The canned summary shown when the backend analysis is unavailable.
pub fn fallback_summary(tier: QualityTier) -> &'static str {
    match tier {
        QualityTier::Limited => {
            "Most answers were very brief, which leaves limited material for an \
             assessment. A follow-up conversation is recommended to give the \
             candidate room to elaborate."
        }
        QualityTier::Fair => {
            "The answers give a fair picture of the candidate. Several responses \
             were short; a deeper discussion of those topics would sharpen the \
             assessment."
        }
        QualityTier::Excellent => {
            "The candidate gave detailed, substantive answers throughout the \
             interview, providing an excellent basis for assessment."
        }
    }
}

fn tier_color(tier: QualityTier) -> &'static str {
    match tier {
        QualityTier::Limited => "#FF7043",
        QualityTier::Fair => "#40C4FF",
        QualityTier::Excellent => "#66BB6A",
    }
}

/// Renders the tier-appropriate placeholder SVG used in degraded mode.
pub fn placeholder_svg(tier: QualityTier) -> String {
    let color = tier_color(tier);
    format!(
        r#"<svg width="300" height="300" viewBox="0 0 300 300" xmlns="http://www.w3.org/2000/svg">
  <circle cx="150" cy="150" r="120" fill="none" stroke="{color}" stroke-width="4"/>
  <text x="150" y="158" text-anchor="middle" font-size="28" fill="{color}">{label}</text>
</svg>"#,
        label = tier.label(),
    )
}

/// Maps a 0-100 performance score onto the three tiers for glyph rendering.
pub fn tier_for_score(score: u8) -> QualityTier {
    match score {
        s if s >= 70 => QualityTier::Excellent,
        s if s >= 45 => QualityTier::Fair,
        _ => QualityTier::Limited,
    }
}

/// Renders the server-side glyph artifact for a finished session.
pub fn render_glyph(score: u8, answered: usize, total_questions: usize) -> Glyph {
    let tier = tier_for_score(score);
    let color = tier_color(tier);
    // A ring whose sweep is proportional to the score, with the tier label.
    let svg = format!(
        r##"<svg width="300" height="300" viewBox="0 0 300 300" xmlns="http://www.w3.org/2000/svg">
  <circle cx="150" cy="150" r="120" fill="none" stroke="#263238" stroke-width="8"/>
  <circle cx="150" cy="150" r="120" fill="none" stroke="{color}" stroke-width="8"
          stroke-dasharray="{dash:.1} 754" transform="rotate(-90 150 150)"/>
  <text x="150" y="140" text-anchor="middle" font-size="48" fill="{color}">{score}</text>
  <text x="150" y="185" text-anchor="middle" font-size="22" fill="{color}">{label}</text>
</svg>"##,
        dash = score as f32 / 100.0 * 754.0,
        label = tier.label(),
    );
    let profile = match tier {
        QualityTier::Excellent => format!(
            "An exceptional candidate: {answered} of {total_questions} questions answered \
             with an overall score of {score}/100. Demonstrates structured thinking and \
             professional maturity."
        ),
        QualityTier::Fair => format!(
            "A promising candidate: {answered} of {total_questions} questions answered \
             with an overall score of {score}/100. Shows solid potential with room to grow."
        ),
        QualityTier::Limited => format!(
            "A candidate at an early stage: {answered} of {total_questions} questions \
             answered with an overall score of {score}/100. More material is needed for a \
             confident assessment."
        ),
    };
    Glyph { svg, profile }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_answers_score_low() {
        let analysis = analyze_answer("yes", &["team".to_string()]);
        assert!(analysis.score <= 10);
        assert_eq!(analysis.word_count, 1);
    }

    #[test]
    fn detailed_answer_scores_high() {
        let text = "In my previous role I led a team of five engineers. For example, \
                    when a release slipped, I specifically re-planned the sprint, split \
                    the work into smaller deliverables, and paired the junior engineers \
                    with seniors. The team shipped two weeks later with no overtime. \
                    That experience shaped how I approach planning and communication \
                    under pressure, and it is the approach I still use today.";
        let analysis = analyze_answer(text, &["team".to_string(), "experience".to_string()]);
        assert!(analysis.has_examples);
        assert!(analysis.has_specifics);
        assert!(analysis.score >= 80);
    }

    #[test]
    fn performance_score_adds_completion_bonus() {
        let analyses: Vec<AnswerAnalysis> = (0..10)
            .map(|_| analyze_answer("a perfectly ordinary answer of reasonable length here", &[]))
            .collect();
        let full = performance_score(&analyses, 10);
        let partial = performance_score(&analyses[..5], 10);
        assert!(full > partial);
    }

    #[test]
    fn performance_score_empty_is_zero() {
        assert_eq!(performance_score(&[], 10), 0);
    }

    #[test]
    fn tier_majority_very_short_is_limited() {
        // 10 answers, 6 of length 2 -> Limited.
        let answers: Vec<String> = (0..10)
            .map(|i| if i < 6 { "no".to_string() } else { "a longer answer".to_string() })
            .collect();
        let tier = classify_tier(answers.iter().map(String::as_str));
        assert_eq!(tier, QualityTier::Limited);
    }

    #[test]
    fn tier_forty_percent_short_is_fair() {
        // 10 answers, 4 of length 5 and 6 of length 40 -> Fair.
        let long = "x".repeat(40);
        let answers: Vec<String> = (0..10)
            .map(|i| if i < 4 { "short".to_string() } else { long.clone() })
            .collect();
        let tier = classify_tier(answers.iter().map(String::as_str));
        assert_eq!(tier, QualityTier::Fair);
    }

    #[test]
    fn tier_all_long_is_excellent() {
        let long = "y".repeat(60);
        let answers: Vec<String> = (0..10).map(|_| long.clone()).collect();
        let tier = classify_tier(answers.iter().map(String::as_str));
        assert_eq!(tier, QualityTier::Excellent);
    }

    #[test]
    fn tier_empty_set_is_limited() {
        assert_eq!(classify_tier(std::iter::empty()), QualityTier::Limited);
    }

    #[test]
    fn glyph_svg_carries_tier_label() {
        let glyph = render_glyph(82, 10, 10);
        assert!(glyph.svg.contains("Excellent"));
        assert!(glyph.profile.contains("82/100"));
    }
}
