//! Canned replies standing in for image recognition and NLP.
//!
//! Keyword checks are plain lowercase substring matches, so "hi" also fires
//! for words like "this" or "which".

/// Reply for an uploaded image. Keywords are tried in order
/// `what`, `how`, `identify`, `explain`; the first hit wins.
pub fn generate_mock_response(filename: &str, query: &str) -> String {
    let lowered = query.to_lowercase();

    if lowered.contains("what") {
        format!(
            "Based on the uploaded image '{}', I can see various elements. {}",
            filename, query
        )
    } else if lowered.contains("how") {
        format!(
            "The image shows certain patterns. To answer '{}', I would analyze the visual features.",
            query
        )
    } else if lowered.contains("identify") {
        format!(
            "From the image analysis, I can identify several objects related to your query: '{}'",
            query
        )
    } else if lowered.contains("explain") {
        format!(
            "Let me explain what I see in the image regarding '{}'...",
            query
        )
    } else {
        format!(
            "I've analyzed your image. Regarding '{}', the visual content suggests relevant information that can help answer your question.",
            query
        )
    }
}

pub fn generate_text_response(message: &str) -> String {
    let lowered = message.to_lowercase();

    if lowered.contains("hello") || lowered.contains("hi") {
        "Hello! I'm your conversational image recognition assistant. You can upload an image and ask questions about it!".to_string()
    } else if lowered.contains("help") {
        "I can help you analyze images! Just upload an image and ask questions like 'What objects are in this image?' or 'Describe what you see.'".to_string()
    } else if lowered.contains("how") {
        "To use this chatbot: 1) Upload an image, 2) Type your question about the image, 3) I'll analyze and respond with relevant information.".to_string()
    } else {
        format!(
            "I received your message: '{}'. Please upload an image so I can provide visual analysis along with answering your questions!",
            message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_response_keyword_order() {
        let r = generate_mock_response("20250101_120000_cat.png", "What is this?");
        assert_eq!(
            r,
            "Based on the uploaded image '20250101_120000_cat.png', I can see various elements. What is this?"
        );

        // "how" is checked before "explain"
        let r = generate_mock_response("x.png", "Explain how it works");
        assert!(r.starts_with("The image shows certain patterns."));

        let r = generate_mock_response("x.png", "IDENTIFY the birds");
        assert!(r.starts_with("From the image analysis"));
        assert!(r.ends_with("'IDENTIFY the birds'"));

        let r = generate_mock_response("x.png", "explain the scene");
        assert_eq!(r, "Let me explain what I see in the image regarding 'explain the scene'...");
    }

    #[test]
    fn test_mock_response_fallback() {
        let r = generate_mock_response("x.png", "");
        assert!(r.starts_with("I've analyzed your image. Regarding ''"));
    }

    #[test]
    fn test_text_response_rules() {
        assert!(generate_text_response("Hello there").starts_with("Hello!"));
        assert!(generate_text_response("HI").starts_with("Hello!"));
        // substring match: "this" contains "hi"
        assert!(generate_text_response("what is this").starts_with("Hello!"));
        assert!(generate_text_response("I need HELP").starts_with("I can help you"));
        assert!(generate_text_response("how do I use it").starts_with("To use this chatbot"));

        let r = generate_text_response("Good morning");
        assert_eq!(
            r,
            "I received your message: 'Good morning'. Please upload an image so I can provide visual analysis along with answering your questions!"
        );
    }
}
