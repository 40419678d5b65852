//! Prompt construction.

use serde::Serialize;

use medthing_core::{Appointment, HealthMetric, Medication, Patient};

/// Everything the generator is told about one patient.
#[derive(Debug, Clone, Serialize)]
pub struct ReportInput {
    pub patient: Patient,
    pub medications: Vec<Medication>,
    pub appointments: Vec<Appointment>,
    pub metrics: Vec<HealthMetric>,
}

const PREAMBLE: &str = "You are an experienced medical professional generating a comprehensive health report.
Generate a detailed medical report for the following patient based on their data.";

const OUTPUT_FORMAT: &str = r#"Format the report STRICTLY as a JSON object with the following structure ONLY. Do NOT include any text before or after the JSON object (like 'Here is the JSON:' or markdown fences).
{
	"summary": "Executive summary of patient's health (1-2 paragraphs)",
	"sections": [
		{
			"title": "Section Title",
			"content": "Detailed HTML content string with findings and analysis"
		},
		{
			"title": "Another Section Title",
			"content": "More HTML content..."
		}
	],
	"recommendations": [
		"Recommendation 1 as a string",
		"Recommendation 2 as a string"
	]
}

Make the report professional and evidence-based.
Ensure 'content' fields contain valid HTML strings.
Include at least 3-5 detailed sections and 3-5 specific recommendations.
Generate ONLY the JSON object as requested."#;

/// Render the provider-agnostic prompt for `input`.
pub fn build_prompt(input: &ReportInput) -> Result<String, serde_json::Error> {
    let patient = serde_json::to_string_pretty(&input.patient)?;
    let medications = serde_json::to_string_pretty(&input.medications)?;
    let appointments = serde_json::to_string_pretty(&input.appointments)?;
    let metrics = serde_json::to_string_pretty(&input.metrics)?;

    Ok(format!(
        "{PREAMBLE}\n\n\
         PATIENT INFORMATION:\n{patient}\n\n\
         MEDICATIONS:\n{medications}\n\n\
         APPOINTMENT HISTORY:\n{appointments}\n\n\
         HEALTH METRICS:\n{metrics}\n\n\
         {OUTPUT_FORMAT}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ReportInput {
        let patient = Patient::new("Grace Hopper", "1906-12-09");
        let medication = Medication {
            id: uuid::Uuid::now_v7(),
            patient_id: patient.id,
            name: "Metformin".into(),
            dosage: "500mg".into(),
            frequency: "daily".into(),
            start_date: "2024-01-01".into(),
            end_date: String::new(),
            notes: String::new(),
        };
        ReportInput {
            patient,
            medications: vec![medication],
            appointments: vec![],
            metrics: vec![],
        }
    }

    #[test]
    fn embeds_each_section_in_order() {
        let prompt = build_prompt(&input()).unwrap();
        let positions: Vec<usize> = [
            "PATIENT INFORMATION:",
            "MEDICATIONS:",
            "APPOINTMENT HISTORY:",
            "HEALTH METRICS:",
            "Generate ONLY the JSON object",
        ]
        .iter()
        .map(|h| prompt.find(h).unwrap_or_else(|| panic!("missing {h}")))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn embeds_record_data_as_json() {
        let prompt = build_prompt(&input()).unwrap();
        assert!(prompt.contains("\"name\": \"Grace Hopper\""));
        assert!(prompt.contains("\"dosage\": \"500mg\""));
        assert!(prompt.contains("APPOINTMENT HISTORY:\n[]"));
    }

    #[test]
    fn asks_for_the_three_fields() {
        let prompt = build_prompt(&input()).unwrap();
        for key in ["\"summary\"", "\"sections\"", "\"recommendations\""] {
            assert!(prompt.contains(key));
        }
    }
}
