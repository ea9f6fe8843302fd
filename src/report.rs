use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::{Assessment, RiskBand};

#[derive(Debug, Clone)]
pub struct BandSummary {
    pub band: RiskBand,
    pub count: usize,
    pub avg_probability: f64,
}

/// Mix of risk bands across a scored cohort, highest band first. Bands with
/// no patients are omitted.
pub fn summarize_by_band(assessments: &[Assessment]) -> Vec<BandSummary> {
    let mut summaries = Vec::new();

    for band in [RiskBand::High, RiskBand::Medium, RiskBand::Low] {
        let probabilities: Vec<f64> = assessments
            .iter()
            .filter(|assessment| assessment.result.risk_band == band)
            .map(|assessment| assessment.result.probability)
            .collect();

        if probabilities.is_empty() {
            continue;
        }

        summaries.push(BandSummary {
            band,
            count: probabilities.len(),
            avg_probability: probabilities.iter().sum::<f64>() / probabilities.len() as f64,
        });
    }

    summaries
}

pub fn build_report(
    source: &str,
    generated_at: DateTime<Utc>,
    assessments: &[Assessment],
) -> String {
    let summaries = summarize_by_band(assessments);

    let mut output = String::new();

    let _ = writeln!(output, "# Diabetes Risk Screening Report");
    let _ = writeln!(
        output,
        "Generated {} from {}",
        generated_at.format("%Y-%m-%d %H:%M UTC"),
        source
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk Band Mix");

    if summaries.is_empty() {
        let _ = writeln!(output, "No patients scored for this cohort.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(
                output,
                "- {}: {} patients (avg probability {:.2})",
                summary.band, summary.count, summary.avg_probability
            );
        }
    }

    let mut ranked: Vec<&Assessment> = assessments.iter().collect();
    ranked.sort_by(|a, b| {
        b.result
            .probability
            .partial_cmp(&a.result.probability)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let _ = writeln!(output);
    let _ = writeln!(output, "## Highest Risk Patients");

    if ranked.is_empty() {
        let _ = writeln!(output, "No patients scored for this cohort.");
    } else {
        for assessment in ranked.iter().take(10) {
            let _ = writeln!(
                output,
                "- {} probability {:.2} ({})",
                assessment.patient, assessment.result.probability, assessment.result.risk_band
            );
        }
    }

    let flagged: Vec<&Assessment> = ranked
        .iter()
        .copied()
        .filter(|assessment| assessment.result.decision == 1)
        .collect();

    let _ = writeln!(output);
    let _ = writeln!(output, "## Flagged Patients");

    if flagged.is_empty() {
        let _ = writeln!(output, "No patients flagged by the classifier.");
    } else {
        for assessment in flagged.iter() {
            let _ = writeln!(
                output,
                "- {} probability {:.2}",
                assessment.patient, assessment.result.probability
            );
        }
        let _ = writeln!(output);
        let _ = writeln!(output, "{}", flagged[0].result.advisory());
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PatientRecord, ScoredResult};

    fn assessment(patient: &str, probability: f64) -> Assessment {
        let result = ScoredResult {
            probability,
            decision: u8::from(probability >= 0.5),
            risk_band: RiskBand::from_probability(probability),
        };
        Assessment::new(patient, PatientRecord::default(), result)
    }

    #[test]
    fn band_mix_counts_and_averages() {
        let assessments = vec![
            assessment("p-001", 0.1),
            assessment("p-002", 0.2),
            assessment("p-003", 0.9),
        ];

        let summaries = summarize_by_band(&assessments);
        assert_eq!(summaries.len(), 2);

        assert_eq!(summaries[0].band, RiskBand::High);
        assert_eq!(summaries[0].count, 1);
        assert!((summaries[0].avg_probability - 0.9).abs() < 1e-12);

        assert_eq!(summaries[1].band, RiskBand::Low);
        assert_eq!(summaries[1].count, 2);
        assert!((summaries[1].avg_probability - 0.15).abs() < 1e-12);
    }

    #[test]
    fn report_ranks_patients_and_lists_flags() {
        let assessments = vec![
            assessment("p-low", 0.10),
            assessment("p-high", 0.91),
            assessment("p-mid", 0.40),
        ];

        let report = build_report("cohort.csv", Utc::now(), &assessments);
        assert!(report.contains("# Diabetes Risk Screening Report"));
        assert!(report.contains("## Risk Band Mix"));

        let high_pos = report.find("- p-high probability 0.91").unwrap();
        let mid_pos = report.find("- p-mid probability 0.40").unwrap();
        let low_pos = report.find("- p-low probability 0.10").unwrap();
        assert!(high_pos < mid_pos && mid_pos < low_pos);

        assert!(report.contains("## Flagged Patients"));
        assert!(report.contains("Consider consulting a medical professional."));
    }

    #[test]
    fn empty_cohort_report_stays_well_formed() {
        let report = build_report("cohort.csv", Utc::now(), &[]);
        assert!(report.contains("No patients scored for this cohort."));
        assert!(report.contains("No patients flagged by the classifier."));
    }
}
