/// One sample of a pattern's reference curve: minute of day against the
/// cohort median glucose at that minute.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapePoint {
    pub minute_of_day: u32,
    pub median: f64,
}

/// Resource file for a pattern's shape template, when one exists. Detected
/// patterns outside this registry are reported without a curve; they still
/// count toward overlay presence.
pub fn shape_resource(pattern_id: &str) -> Option<&'static str> {
    match pattern_id {
        "dawn_phenomenon" => Some("dawn_phenomenon_summary_time_of_day.csv"),
        "dual_peak" => Some("dual_peak_summary_time_of_day.csv"),
        "nocturnal_hypoglycemia_moderate" => {
            Some("nocturnal_hypoglycemia_moderate_summary_time_of_day.csv")
        }
        "nocturnal_hypoglycemia_severe" => {
            Some("nocturnal_hypoglycemia_severe_summary_time_of_day.csv")
        }
        "overnight_compression_low" => Some("overnight_compression_low_summary_time_of_day.csv"),
        "overnight_hyperglycemia" => Some("overnight_hyperglycemia_summary_time_of_day.csv"),
        "somogyi_effect" => Some("somogyi_effect_summary_time_of_day.csv"),
        _ => None,
    }
}

/// Parse a shape-template CSV. The header row locates the `time_minutes`
/// and `median` columns; rows where either value is missing or non-numeric
/// are skipped. Missing required headers produce an empty template.
pub fn parse_shape_csv(data: &str) -> Vec<ShapePoint> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data.as_bytes());

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(_) => return Vec::new(),
    };
    let minutes_col = headers.iter().position(|h| h.trim() == "time_minutes");
    let median_col = headers.iter().position(|h| h.trim() == "median");
    let (Some(minutes_col), Some(median_col)) = (minutes_col, median_col) else {
        return Vec::new();
    };

    let mut points = Vec::new();
    for record in reader.records() {
        let Ok(record) = record else { continue };
        let minutes = record
            .get(minutes_col)
            .and_then(|value| value.trim().parse::<f64>().ok());
        let median = record
            .get(median_col)
            .and_then(|value| value.trim().parse::<f64>().ok());
        if let (Some(minutes), Some(median)) = (minutes, median) {
            if minutes.is_finite() && median.is_finite() {
                points.push(ShapePoint {
                    minute_of_day: minutes as u32,
                    median,
                });
            }
        }
    }
    points
}
