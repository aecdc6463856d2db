use crate::models::suggestion::{ ResourceKind, SuggestionPayload };

pub const FALLBACK_RESPONSE: &str =
    "I received your request but couldn't generate a complete response. Please try rephrasing your question.";

fn present(field: &Option<String>) -> Option<&str> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn resource_marker(kind: &ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Course => "🎓",
        ResourceKind::Youtube => "📺",
        ResourceKind::Book => "📖",
        ResourceKind::Article | ResourceKind::Other(_) => "📄",
    }
}

/// Turns a generator payload into the markdown-lite text stored on the
/// assistant message. Sections appear in a fixed order and only when their
/// field carries something; each one is closed by a blank line except the
/// trailing video link.
pub fn format_suggestion(data: &SuggestionPayload) -> String {
    let mut response = String::new();

    if let Some(title) = present(&data.title) {
        response.push_str(&format!("**{}**\n\n", title));
    }

    if let Some(explanation) = present(&data.explanation) {
        response.push_str(&format!("{}\n\n", explanation));
    }

    if let Some(salary) = present(&data.average_salary) {
        response.push_str(&format!("💰 **Average Salary:** {}\n\n", salary));
    }

    if let Some(openings) = present(&data.job_openings) {
        response.push_str(&format!("📊 **Job Market:** {}\n\n", openings));
    }

    if !data.learning_resources.is_empty() {
        response.push_str("📚 **Learning Resources:**\n");
        for (idx, resource) in data.learning_resources.iter().enumerate() {
            response.push_str(
                &format!(
                    "{}. {} [{}]({})\n",
                    idx + 1,
                    resource_marker(&resource.kind),
                    resource.title.as_deref().unwrap_or_default(),
                    resource.url.as_deref().unwrap_or_default()
                )
            );
        }
        response.push('\n');
    }

    if let Some(video) = present(&data.youtube_video_recommendation) {
        response.push_str(
            &format!("🎥 **Recommended Video:** [Watch on YouTube]({})\n", video)
        );
    }

    let trimmed = response.trim();
    if trimmed.is_empty() {
        FALLBACK_RESPONSE.to_string()
    } else {
        trimmed.to_string()
    }
}
