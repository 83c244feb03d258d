pub mod copilot2openai;
