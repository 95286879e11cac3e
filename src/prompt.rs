use crate::settings::{ClothingStyle, HeadshotSettings};

/// Renders the instruction text for an initial generation call. Pure; the
/// selected background and lighting descriptions are interpolated verbatim.
pub fn build_generation_prompt(settings: &HeadshotSettings) -> String {
    let mut prompt = String::from(
        "Act as a professional photo editor. Transform this image into a high-quality professional headshot.\n\
         \n\
         Instructions:\n\
         1. Maintain the person's facial identity and key features strictly.\n\
         2. Improve the skin texture slightly (remove minor blemishes) but keep it natural.\n",
    );

    prompt.push_str(&format!(
        "3. Change the background to: {}. Ensure the background is blurred (bokeh) to keep focus on the subject.\n",
        settings.background.description()
    ));
    prompt.push_str(&format!(
        "4. Apply lighting style: {}. Ensure the face is well-lit.\n",
        settings.lighting.description()
    ));

    if settings.clothing == ClothingStyle::KeepOriginal {
        prompt.push_str("5. Keep the original clothing but make it look neat and pressed.\n");
    } else {
        prompt.push_str(&format!(
            "5. Change the clothing to: {}. Fit the clothing naturally to the person's pose.\n",
            settings.clothing.description()
        ));
    }

    if settings.enhance_face {
        prompt.push_str(
            "6. Subtle facial enhancement: sharpen eyes, smooth skin tone, whiten teeth slightly.\n",
        );
    }

    prompt.push_str(
        "\nOutput a photorealistic, high-resolution image suitable for a professional profile picture.",
    );
    prompt
}

/// Renders the instruction text for a refinement call against the current
/// result. The user instruction is quoted verbatim.
pub fn build_refinement_prompt(instruction: &str) -> String {
    format!(
        "Act as a professional photo editor. Edit this image based on the user's request.\n\
         \n\
         User Instruction: \"{instruction}\"\n\
         \n\
         Requirements:\n\
         1. STRICTLY follow the user's instruction.\n\
         2. Maintain photorealism and high resolution (1024x1024 equivalent).\n\
         3. Keep the professional headshot style established in the image.\n\
         4. Do not alter features that were not requested to be changed.\n"
    )
}
