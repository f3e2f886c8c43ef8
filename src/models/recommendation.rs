use serde::{Deserialize, Serialize};

/// A generated recommendation that still needs an image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    /// Short title, 2-5 words
    pub title: String,
    /// One-line description, at most 100 characters
    pub description: String,
    /// 2-4 word photo search phrase; never shown to the user
    pub visual_search_phrase: String,
    /// Outbound link for the recommendation
    pub url: String,
}

impl Candidate {
    /// Combines the candidate with its resolved image, dropping the search phrase
    pub fn into_recommendation(self, image_url: String) -> Recommendation {
        Recommendation {
            title: self.title,
            description: self.description,
            image_url,
            url: self.url,
        }
    }
}

/// Envelope the language model fills in
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateBatch {
    pub recommendations: Vec<Candidate>,
}

/// A fully resolved recommendation card returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_recommendation_drops_search_phrase() {
        let candidate = Candidate {
            title: "Kyoto Tea Houses".to_string(),
            description: "Centuries-old tea rooms in Gion".to_string(),
            visual_search_phrase: "kyoto wooden teahouse".to_string(),
            url: "https://example.com/kyoto".to_string(),
        };

        let recommendation =
            candidate.into_recommendation("https://images.pexels.com/1.jpg".to_string());
        let json = serde_json::to_value(&recommendation).unwrap();

        assert_eq!(json["title"], "Kyoto Tea Houses");
        assert_eq!(json["image_url"], "https://images.pexels.com/1.jpg");
        assert_eq!(json["url"], "https://example.com/kyoto");
        assert!(json.get("visual_search_phrase").is_none());
    }

    #[test]
    fn test_candidate_batch_deserialization() {
        let json = r#"{
            "recommendations": [
                {
                    "title": "Northern Lights Tour",
                    "description": "Chase auroras across Lapland",
                    "visual_search_phrase": "aurora over snowy forest",
                    "url": "https://example.com/aurora"
                }
            ]
        }"#;

        let batch: CandidateBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.recommendations.len(), 1);
        assert_eq!(
            batch.recommendations[0].visual_search_phrase,
            "aurora over snowy forest"
        );
    }
}
