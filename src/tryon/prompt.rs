//! Instruction text sent alongside the images.
//!
//! [`compose_styling_prompt`] is a pure function of the garment count, the
//! user's [`CustomizationSelections`] and their free text: the same inputs
//! always produce the same bytes. A selection left at its `Default` variant
//! contributes nothing, and the `USER CUSTOMIZATIONS` block only appears when
//! something in it is active.
//!
//! ```
//! use tryon::prompt::{compose_styling_prompt, BodyShape, CustomizationSelections};
//!
//! let plain = compose_styling_prompt(2, &CustomizationSelections::default(), "");
//! assert!(plain.contains("ALL 2 items"));
//! assert!(!plain.contains("USER CUSTOMIZATIONS"));
//!
//! let selections = CustomizationSelections {
//!     shape: BodyShape::Athletic,
//!     ..Default::default()
//! };
//! let custom = compose_styling_prompt(2, &selections, "  beach background ");
//! assert!(custom.contains("- Adjust the model's body shape to be more 'Athletic'."));
//! assert!(custom.ends_with("- Additional instruction: \"beach background\"."));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed instruction used when upscaling a previous result.
pub const UPSCALE_PROMPT: &str = "You are an expert AI photo editor specializing in image upscaling. Your sole task is to enhance the [Model Image] provided. Increase its resolution to the maximum possible quality (e.g., 4K resolution), sharpen details, improve texture fidelity, and refine lighting without altering the image's content. CRITICAL INSTRUCTION: You MUST NOT change the subject, colors, composition, or any other artistic aspect of the original [Model Image]. The output must be a photorealistic, higher-fidelity version of the exact same input [Model Image].";

macro_rules! customization_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum $name {
            /// Neutral choice; adds no instruction.
            #[default]
            Default,
            $($variant,)+
        }

        impl $name {
            /// Every choice, `Default` first.
            pub const ALL: &'static [$name] = &[$name::Default, $($name::$variant),+];

            /// Human-readable label used in the prompt and in pickers.
            pub fn label(&self) -> &'static str {
                match self {
                    $name::Default => "Default",
                    $($name::$variant => $label,)+
                }
            }

            pub fn is_default(&self) -> bool {
                matches!(self, $name::Default)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

customization_enum!(
    /// Body shape adjustment applied to the model.
    BodyShape {
        Slim => "Slim",
        Athletic => "Athletic",
        Curvy => "Curvy",
        PlusSize => "Plus-size",
    }
);

customization_enum!(
    /// Facial expression adjustment; identity is always preserved.
    Expression {
        Smiling => "Smiling",
        Neutral => "Neutral",
        Serious => "Serious",
        Confident => "Confident",
        Playful => "Playful",
    }
);

customization_enum!(
    /// Overall look of the photograph (lighting, mood).
    AestheticStyle {
        Natural => "Natural",
        Glamorous => "Glamorous",
        Editorial => "Editorial",
        Vintage => "Vintage",
        Minimalist => "Minimalist",
    }
);

/// The user's customization choices. All `Default` means "no customization".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomizationSelections {
    pub shape: BodyShape,
    pub expression: Expression,
    pub aesthetic: AestheticStyle,
}

impl CustomizationSelections {
    pub fn is_default(&self) -> bool {
        self.shape.is_default() && self.expression.is_default() && self.aesthetic.is_default()
    }
}

/// Build the styling instruction for `item_count` garments.
pub fn compose_styling_prompt(
    item_count: usize,
    selections: &CustomizationSelections,
    free_text: &str,
) -> String {
    let items = if item_count == 1 { "item" } else { "items" };
    let mut parts: Vec<String> = vec![
        "You are an expert AI fashion stylist and senior e-commerce photo editor. Your objective is to generate a single, professional, photorealistic e-commerce fashion photograph.".to_string(),
        format!(
            "Your task is to take the person from the [Model Image] and realistically dress them in ALL {} {} provided in the individually labeled [Garment Image] inputs (e.g., top, bottom, shoes, accessories). Every one of the {} {} must be visible in the final image.",
            item_count, items, item_count, items
        ),
        "\nCRITICAL INSTRUCTIONS (MUST BE FOLLOWED):".to_string(),
        "IDENTITY PRESERVATION: You MUST preserve the model's original face, hair, and skin tone. The identity of the person in the output image must be an EXACT MATCH to the original [Model Image]. Do NOT alter, modify, or generate new facial features under any circumstances.".to_string(),
        "POSE CONTINUITY: Keep the model's original pose, body proportions, and camera framing from the [Model Image].".to_string(),
        "HEADLESS CASE: If the original [Model Image] is headless (does not show a face), the output image MUST also be headless. Do not invent or generate a face.".to_string(),
        "\nQUALITY & REALISM REQUIREMENTS:".to_string(),
        "SEAMLESS BLENDING: Seamlessly blend the new clothing onto the model's body. The result must be photorealistic.".to_string(),
        "PRODUCT AUTHENTICITY: Preserve the authenticity of the garments. The texture, material properties (e.g., sheen, wrinkles, fabric type), and original form of the items from the [Garment Image] inputs must be accurately and naturally represented.".to_string(),
        "NATURAL PHYSICS: Ensure all lighting, shadows, and fabric folds conform realistically to the model's body and pose.".to_string(),
        "\nNEGATIVE CONSTRAINTS:".to_string(),
        "Do NOT add garments or accessories that were not provided. Do NOT omit any provided item. Do NOT change the background, the model's identity, or the model's pose. Do NOT add text, logos, or watermarks.".to_string(),
        "\nFINAL OUTPUT: The final output should be a clean, high-resolution image (2000x3000 pixels) of only the styled model.".to_string(),
    ];

    let customizations = customization_lines(selections, free_text);
    if !customizations.is_empty() {
        parts.push("\nUSER CUSTOMIZATIONS:".to_string());
        parts.extend(customizations);
    }

    parts.join("\n")
}

/// One line per active customization, in shape, expression, aesthetic, free-text order.
fn customization_lines(selections: &CustomizationSelections, free_text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    if !selections.shape.is_default() {
        lines.push(format!(
            "- Adjust the model's body shape to be more '{}'.",
            selections.shape
        ));
    }
    if !selections.expression.is_default() {
        lines.push(format!(
            "- Gently modify the model's facial expression to be '{}', while keeping their core facial identity unchanged.",
            selections.expression
        ));
    }
    if !selections.aesthetic.is_default() {
        lines.push(format!(
            "- Apply a '{}' aesthetic to the overall image style (e.g., lighting, mood).",
            selections.aesthetic
        ));
    }
    let free_text = free_text.trim();
    if !free_text.is_empty() {
        lines.push(format!("- Additional instruction: \"{}\".", free_text));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_is_deterministic() {
        let selections = CustomizationSelections {
            shape: BodyShape::Curvy,
            expression: Expression::Smiling,
            aesthetic: AestheticStyle::Vintage,
        };
        assert_eq!(
            compose_styling_prompt(3, &selections, "retro filter"),
            compose_styling_prompt(3, &selections, "retro filter")
        );
    }

    #[test]
    fn count_is_stated_exactly() {
        let prompt = compose_styling_prompt(4, &CustomizationSelections::default(), "");
        assert!(prompt.contains("ALL 4 items"));
        assert!(prompt.contains("Every one of the 4 items"));

        let single = compose_styling_prompt(1, &CustomizationSelections::default(), "");
        assert!(single.contains("ALL 1 item provided"));
    }

    #[test]
    fn blocks_appear_in_order() {
        let selections = CustomizationSelections {
            aesthetic: AestheticStyle::Editorial,
            ..Default::default()
        };
        let prompt = compose_styling_prompt(2, &selections, "");
        let positions: Vec<usize> = [
            "You are an expert AI fashion stylist",
            "ALL 2 items",
            "CRITICAL INSTRUCTIONS",
            "QUALITY & REALISM REQUIREMENTS",
            "NEGATIVE CONSTRAINTS",
            "FINAL OUTPUT",
            "USER CUSTOMIZATIONS",
        ]
        .iter()
        .map(|needle| prompt.find(needle).unwrap())
        .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn defaults_contribute_no_lines() {
        let prompt = compose_styling_prompt(2, &CustomizationSelections::default(), "   ");
        assert!(!prompt.contains("USER CUSTOMIZATIONS"));
        assert!(!prompt.contains("'Default'"));
        assert!(!prompt.contains("Additional instruction"));
    }

    #[test]
    fn each_active_selection_is_exactly_one_line() {
        for shape in BodyShape::ALL.iter().filter(|s| !s.is_default()) {
            let selections = CustomizationSelections {
                shape: *shape,
                ..Default::default()
            };
            let prompt = compose_styling_prompt(1, &selections, "");
            let needle = format!("'{}'", shape.label());
            assert_eq!(prompt.lines().filter(|l| l.contains(&needle)).count(), 1);
            assert_eq!(prompt.lines().filter(|l| l.starts_with("- ")).count(), 1);
        }
    }

    #[test]
    fn all_customizations_listed_in_order() {
        let selections = CustomizationSelections {
            shape: BodyShape::PlusSize,
            expression: Expression::Confident,
            aesthetic: AestheticStyle::Minimalist,
        };
        let prompt = compose_styling_prompt(2, &selections, "  studio lighting\n");
        let lines: Vec<&str> = prompt.lines().filter(|l| l.starts_with("- ")).collect();
        assert_eq!(
            lines,
            vec![
                "- Adjust the model's body shape to be more 'Plus-size'.",
                "- Gently modify the model's facial expression to be 'Confident', while keeping their core facial identity unchanged.",
                "- Apply a 'Minimalist' aesthetic to the overall image style (e.g., lighting, mood).",
                "- Additional instruction: \"studio lighting\".",
            ]
        );
    }

    #[test]
    fn free_text_alone_opens_the_block() {
        let prompt = compose_styling_prompt(1, &CustomizationSelections::default(), "red scarf");
        assert!(prompt.contains("\n\nUSER CUSTOMIZATIONS:\n- Additional instruction: \"red scarf\"."));
    }

    #[test]
    fn selections_round_trip_through_serde() {
        let selections = CustomizationSelections {
            shape: BodyShape::Slim,
            expression: Expression::Default,
            aesthetic: AestheticStyle::Glamorous,
        };
        let json = serde_json::to_string(&selections).unwrap();
        let back: CustomizationSelections = serde_json::from_str(&json).unwrap();
        assert_eq!(back, selections);
        assert!(!back.is_default());
    }
}
