use codellm_llm::provider::Message;

const CODE_SUMMARY: &str = "You are summarizing a source file so that it can be found later by \
semantic search. Describe what the file does, its main responsibilities, the important types and \
functions it defines, and how it interacts with the rest of the project. Respond with the summary \
only, in plain prose.";

const CODE_ELEMENTS: &str = "You are cataloguing a source file so that it can be found later by \
semantic search. List the code elements the file defines or exports: functions, methods, types, \
traits, interfaces, constants and modules. Give each element's name, kind and a one-sentence \
description. Respond with the list only.";

const DOC_SUMMARY: &str = "You are summarizing a documentation file so that it can be found later \
by semantic search. Describe the topics it covers, the questions it answers and any procedures or \
configuration it documents. Respond with the summary only, in plain prose.";

/// System prompt used to turn a file into the text that gets embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizePrompt {
    system: String,
}

impl SummarizePrompt {
    #[must_use]
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
        }
    }

    #[must_use]
    pub fn code_summary() -> Self {
        Self::new(CODE_SUMMARY)
    }

    #[must_use]
    pub fn code_elements() -> Self {
        Self::new(CODE_ELEMENTS)
    }

    #[must_use]
    pub fn doc_summary() -> Self {
        Self::new(DOC_SUMMARY)
    }

    #[must_use]
    pub fn system(&self) -> &str {
        &self.system
    }

    /// Chat messages asking the model to summarize `content` found at `file_path`.
    #[must_use]
    pub fn messages(&self, file_path: &str, content: &str) -> Vec<Message> {
        vec![
            Message::system(self.system.clone()),
            Message::user(format!("File: {file_path}\n\n{content}")),
        ]
    }
}
