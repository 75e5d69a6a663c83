//! Prompt templates for the graders, generator and rewriter

use crate::domain::retrieval::{join_contents, Document};

pub const RELEVANCE_SYSTEM: &str = "You are a grader assessing relevance of a retrieved document to a user question. \
If the document contains keyword(s) or semantic meaning related to the user question, grade it as relevant. \
It does not need to be a stringent test. The goal is to filter out erroneous retrievals. \
Give a binary score 'yes' or 'no' score to indicate whether the document is relevant to the question.";

pub const GROUNDEDNESS_SYSTEM: &str = "You are a grader assessing whether an LLM generation is grounded in / supported by a set of retrieved facts. \
Give a binary score 'yes' or 'no'. 'yes' means that the answer is grounded in / supported by the set of facts.";

pub const USEFULNESS_SYSTEM: &str = "You are a grader assessing whether an answer addresses / resolves a question. \
Give a binary score 'yes' or 'no'. 'yes' means that the answer resolves the question.";

pub const REWRITE_SYSTEM: &str = "You are a question re-writer that converts an input question to a better version that is optimized \
for vectorstore retrieval. Look at the input and try to reason about the underlying semantic intent / meaning. \
Reply with the improved question only.";

pub fn relevance_user(question: &str, document: &Document) -> String {
    format!(
        "Retrieved document: \n\n {} \n\n User question: {}",
        document.content(),
        question
    )
}

pub fn groundedness_user(documents: &[Document], answer: &str) -> String {
    format!(
        "Set of facts: \n\n {} \n\n LLM generation: {}",
        join_contents(documents),
        answer
    )
}

pub fn usefulness_user(question: &str, answer: &str) -> String {
    format!(
        "User question: \n\n {} \n\n LLM generation: {}",
        question, answer
    )
}

pub fn generation_user(question: &str, documents: &[Document]) -> String {
    format!(
        "You are an assistant for question-answering tasks. Use the following pieces of retrieved context to answer the question. \
If you don't know the answer, just say that you don't know. Use three sentences maximum and keep the answer concise.\n\n\
Question: {}\n\
Context: {}\n\
Answer:",
        question,
        join_contents(documents)
    )
}

pub fn rewrite_user(question: &str) -> String {
    format!(
        "Here is the initial question: \n\n {} \n Formulate an improved question.",
        question
    )
}
