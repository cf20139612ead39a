use crate::models::{ImageStyle, Platform, Tone};

pub fn posts_prompt(content: &str, platform: Platform, tone: Tone, feedback: Option<&str>) -> String {
    let feedback_instruction = feedback
        .map(|f| format!("Please incorporate this feedback into the new posts: \"{}\".", f))
        .unwrap_or_default();

    format!(
        "Based on the following content, write 3 compelling and distinct social media posts for {platform} in a {tone} tone. \
         The content is: \"{content}\". {feedback_instruction} \
         Tailor the length and format appropriately for {platform}. Include relevant hashtags. \
         Use markdown for formatting like bolding or lists where appropriate. \
         Return the response as a JSON array of 3 strings.",
        platform = platform,
        tone = tone,
        content = content,
        feedback_instruction = feedback_instruction,
    )
}

/// Asks the text model to write a prompt for the image model.
pub fn image_prompt_request(content: &str, style: ImageStyle, feedback: Option<&str>) -> String {
    format!(
        "Based on the following user input, create a concise, descriptive, and visually compelling prompt for an AI image generator. \
         The image should be in a {style} style and suitable for a social media post. {feedback} \
         Important: Do not include any text or words in the image. The user input is: \"{content}\"",
        style = style,
        feedback = image_feedback(feedback),
        content = content,
    )
}

pub fn reference_instruction(content: &str, style: ImageStyle, feedback: Option<&str>) -> String {
    format!(
        "Generate an image based on the reference, but in a {style} style. \
         Incorporate the following theme: \"{content}\". {feedback} \
         Important: Do not include any text or words in the generated image.",
        style = style,
        content = content,
        feedback = image_feedback(feedback),
    )
}

fn image_feedback(feedback: Option<&str>) -> String {
    feedback
        .map(|f| format!("Incorporate the following feedback: \"{}\".", f))
        .unwrap_or_default()
}
