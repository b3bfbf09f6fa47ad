use serde::{Deserialize, Serialize};

/// Structured etymological breakdown of a single word, as returned to the
/// caller. Produced once per successful upstream call, never persisted here.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct AnalysisResult {
    pub root: String,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub translation: String,
    pub desc: String,
}

/// Wire shape of the generated payload. The upstream model fills the literal
/// placeholder "None" for a missing prefix or suffix instead of a JSON null.
#[derive(Debug, Deserialize)]
pub struct RawAnalysis {
    pub root: String,
    pub prefix: String,
    pub suffix: String,
    pub translation: String,
    pub desc: String,
}

impl From<RawAnalysis> for AnalysisResult {
    fn from(raw: RawAnalysis) -> Self {
        AnalysisResult {
            root: raw.root,
            prefix: absent_to_none(raw.prefix),
            suffix: absent_to_none(raw.suffix),
            translation: raw.translation,
            desc: raw.desc,
        }
    }
}

fn absent_to_none(field: String) -> Option<String> {
    if field.trim().eq_ignore_ascii_case("none") || field.trim().is_empty() {
        None
    } else {
        Some(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_prefix_and_suffix_map_to_none() {
        let raw = RawAnalysis {
            root: "tele (far)".to_string(),
            prefix: "None".to_string(),
            suffix: "none".to_string(),
            translation: "电话".to_string(),
            desc: "远距离传声的装置".to_string(),
        };

        let result = AnalysisResult::from(raw);
        assert_eq!(result.prefix, None);
        assert_eq!(result.suffix, None);
        assert_eq!(result.root, "tele (far)");
    }

    #[test]
    fn real_affixes_are_kept() {
        let raw = RawAnalysis {
            root: "spect (to look)".to_string(),
            prefix: "in- (into)".to_string(),
            suffix: "-or (agent)".to_string(),
            translation: "检查员".to_string(),
            desc: "向内查看的人".to_string(),
        };

        let result = AnalysisResult::from(raw);
        assert_eq!(result.prefix.as_deref(), Some("in- (into)"));
        assert_eq!(result.suffix.as_deref(), Some("-or (agent)"));
    }
}
