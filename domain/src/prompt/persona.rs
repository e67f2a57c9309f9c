//! Assistant persona and localized fallback texts

/// System instruction bound to every session at creation time.
const SYSTEM_INSTRUCTION: &str = "Bạn là một hệ thống trợ lý AI chuyên sâu về môn Chủ nghĩa xã hội khoa học. Nhiệm vụ của bạn là giải đáp các câu hỏi của người dùng bằng tiếng Việt một cách chính xác, mạch lạc và đúng tinh thần học thuật. Khi trả lời, hãy:

1. Giữ vai trò của một giảng viên – luôn giải thích khái niệm từ dễ đến khó, có dẫn dắt, tránh gây hiểu nhầm.
2. Ưu tiên nội dung dựa trên các tài liệu kinh điển của chủ nghĩa Mác – Lênin, tư tưởng Hồ Chí Minh và các giáo trình chính thống về CNXHKH ở Việt Nam.
3. Trình bày khách quan, không lồng ghép quan điểm chính trị cá nhân hoặc đánh giá chủ quan ngoài phạm vi học thuật.
4. Nếu câu hỏi quá rộng hoặc có yếu tố thời sự, hãy tách thành các ý nhỏ và trả lời từng ý một cách có hệ thống (khái niệm → cơ sở lý luận → vận dụng → ví dụ).
5. Luôn ưu tiên cách diễn đạt trong sáng, dễ hiểu đối với sinh viên nhưng vẫn giữ chuẩn mực thuật ngữ khoa học.";

const GREETING: &str =
    "Xin chào! Tôi là trợ lý AI chuyên về Chủ nghĩa xã hội khoa học. Bạn có câu hỏi nào cần giải đáp không?";

const TITLE: &str = "Trợ lý CNXHKH";

/// The assistant persona (Value Object)
///
/// Immutable for the lifetime of a session: the system instruction is sent
/// once when the session is created and never renegotiated per turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    title: String,
    system_instruction: String,
    greeting: String,
}

impl Persona {
    pub fn new(
        title: impl Into<String>,
        system_instruction: impl Into<String>,
        greeting: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            system_instruction: system_instruction.into(),
            greeting: greeting.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }
}

impl Default for Persona {
    /// The scientific-socialism lecturer persona
    fn default() -> Self {
        Self::new(TITLE, SYSTEM_INSTRUCTION, GREETING)
    }
}

/// Localized texts shown instead of raw errors
pub struct FallbackText;

impl FallbackText {
    /// Shown when the remote call failed (network, remote error, bad response)
    pub fn transport() -> &'static str {
        "Đã xảy ra lỗi khi kết nối với AI. Vui lòng thử lại sau."
    }

    /// Shown when no API key is configured
    pub fn configuration() -> &'static str {
        "Trợ lý AI chưa được cấu hình khóa API. Vui lòng thiết lập khóa API rồi thử lại."
    }

    /// Shown when the user cancelled a pending answer
    pub fn cancelled() -> &'static str {
        "Đã hủy câu trả lời."
    }

    /// Printed under a streamed answer that broke off before it was complete
    pub fn partial_discarded() -> &'static str {
        "(Phần trả lời dang dở ở trên đã bị hủy bỏ.)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_persona_is_vietnamese_lecturer() {
        let persona = Persona::default();
        assert_eq!(persona.title(), "Trợ lý CNXHKH");
        assert!(persona
            .system_instruction()
            .contains("Chủ nghĩa xã hội khoa học"));
        assert!(persona.system_instruction().contains("\n\n1. "));
        assert!(persona.greeting().starts_with("Xin chào!"));
    }

    #[test]
    fn test_fallback_texts_are_distinct() {
        assert_ne!(FallbackText::transport(), FallbackText::configuration());
        assert_ne!(FallbackText::transport(), FallbackText::cancelled());
        assert_ne!(FallbackText::cancelled(), FallbackText::partial_discarded());
    }
}
