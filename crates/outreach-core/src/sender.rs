use serde::{Deserialize, Serialize};

/// Who the campaign is sent on behalf of. Woven into generation prompts,
/// signatures, and fallback templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderProfile {
    pub name: String,
    pub title: String,
    pub company: String,
    pub company_description: String,
    pub value_proposition: String,
    pub services: Vec<String>,
}

impl SenderProfile {
    /// Three-line signature: name, title, company.
    #[must_use]
    pub fn signature(&self) -> String {
        format!("{}\n{}\n{}", self.name, self.title, self.company)
    }

    #[must_use]
    pub fn services_line(&self) -> String {
        if self.services.is_empty() {
            "marketing services".to_string()
        } else {
            self.services.join(", ")
        }
    }
}

impl Default for SenderProfile {
    fn default() -> Self {
        Self {
            name: "Alex".to_string(),
            title: "Founder".to_string(),
            company: "Our Agency".to_string(),
            company_description: "Marketing services".to_string(),
            value_proposition: "We help businesses grow".to_string(),
            services: Vec::new(),
        }
    }
}
