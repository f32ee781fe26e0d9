// ── Provider endpoints and request defaults ──────────────────────────────────

pub mod openrouter {
    pub const API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
    pub const MODEL: &str = "mistralai/mistral-7b-instruct:free";
    pub const CREDENTIAL_KEY: &str = "openrouter_api_key";
}

pub mod gemini {
    pub const API_URL: &str =
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";
    pub const MODEL: &str = "gemini-1.5-flash";
    pub const CREDENTIAL_KEY: &str = "gemini_api_key";
}

pub mod ollama {
    pub const BASE_URL: &str = "http://localhost:11434";
    pub const API_URL: &str = "http://localhost:11434/api/generate";
    pub const MODEL: &str = "llama3";
}

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

// ── User-facing messages ──────────────────────────────────────────────────────

pub const MISSING_KEY_MESSAGE: &str = "Please provide an API key to use this provider.";
pub const REJECTED_KEY_MESSAGE: &str =
    "Invalid or unauthorized API key. Please update your key and try again.";
pub const UNAVAILABLE_MESSAGE: &str = "Something went wrong. Please try again later.";
pub const NO_RESPONSE_MESSAGE: &str = "No response received.";
