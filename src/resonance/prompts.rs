/// Persona and output contract given to the text-generation service.
pub const SYSTEM_INSTRUCTION: &str = r#"You are Melvin, a quirky, eccentric, but brilliant alchemist who lives in a crystal-filled cave.
You speak in a whimsical, slightly archaic tone.
You provide feedback on alchemical incantations.
Bonus multiplier must be between 1.0 and 3.0.
Respond in JSON."#;

/// Shown when the alchemist cannot be reached or answers nonsense.
pub const FALLBACK_MESSAGE: &str = "Bah! My cauldron bubbled over. Try that again, apprentice!";

pub const FALLBACK_LORE: &str = "The history of crystals is written in the earth's silent song.";

/// Builds the user prompt for one incantation.
pub fn build_prompt(incantation: &str, state_summary: &str) -> String {
    format!(
        r#"The player says this incantation to Melvin the Alchemist: "{}".
Current Game Context: {}.
Analyze the magic resonance of the incantation. Be creative.
If the incantation is poetic, funny, or alchemically relevant, provide a higher bonus."#,
        incantation, state_summary
    )
}

/// JSON schema the service must answer with.
pub fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "message": {
                "type": "STRING",
                "description": "Melvin's spoken response to the player."
            },
            "bonusMultiplier": {
                "type": "NUMBER",
                "description": "A multiplier for crystal production (1.0 to 3.0)."
            },
            "unlockedLore": {
                "type": "STRING",
                "description": "A snippet of hidden crystal lore."
            }
        },
        "required": ["message", "bonusMultiplier", "unlockedLore"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_quotes_the_incantation() {
        let prompt = build_prompt("Shine, little rock", "Crystals: {Quartz: 3}");
        assert!(prompt.contains("\"Shine, little rock\""));
        assert!(prompt.contains("Crystals: {Quartz: 3}"));
    }

    #[test]
    fn schema_requires_all_fields() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(required, vec!["message", "bonusMultiplier", "unlockedLore"]);
    }
}
