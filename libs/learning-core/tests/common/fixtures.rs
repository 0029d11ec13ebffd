//! Test data fixtures.

use learning_core::{CefrLevel, QuestionBank, Skill, TestQuestion};

const LEVELS: [CefrLevel; 4] = [CefrLevel::A1, CefrLevel::A2, CefrLevel::B1, CefrLevel::B2];

/// Bank with `per_skill` questions for every skill at A1-B2. The correct
/// option is always index 2.
pub fn placement_bank(per_skill: usize) -> QuestionBank {
    let mut questions = Vec::new();
    for level in LEVELS {
        for skill in Skill::ALL {
            for i in 0..per_skill {
                questions.push(TestQuestion {
                    id: format!("{level}-{skill}-{i:02}"),
                    skill,
                    level,
                    question: format!("{skill} question {i} at {level}"),
                    options: vec![
                        "option a".to_string(),
                        "option b".to_string(),
                        "option c".to_string(),
                        "option d".to_string(),
                    ],
                    correct_answer: 2,
                    explanation: format!("Explanation for {level} {skill} {i}"),
                    context: (skill == Skill::Reading).then(|| "A short passage.".to_string()),
                });
            }
        }
    }
    QuestionBank::new(questions).expect("fixture bank is valid")
}

/// Index of the correct option in [`placement_bank`] questions.
pub const CORRECT: usize = 2;
pub const INCORRECT: usize = 0;

/// Bank JSON as shipped with the app content.
pub fn bank_json() -> &'static str {
    r#"[
        {"id": "a1-v-1", "type": "vocabulary", "level": "A1", "question": "\"사과\" in English?",
         "options": ["apple", "pear", "grape"], "correctAnswer": 0, "explanation": "사과 = apple"},
        {"id": "a2-g-1", "type": "grammar", "level": "A2", "question": "She ___ to school every day.",
         "options": ["go", "goes", "going"], "correctAnswer": 1, "explanation": "Third person singular."},
        {"id": "b1-l-1", "type": "listening", "level": "B1", "question": "What time does the train leave?",
         "options": ["7:15", "7:50", "8:15"], "correctAnswer": 2, "explanation": "",
         "context": "audio/b1-l-1.mp3"},
        {"id": "b2-r-1", "type": "reading", "level": "B2", "question": "The author's main point is...",
         "options": ["cost", "access", "quality", "speed"], "correctAnswer": 1, "explanation": ""}
    ]"#
}
