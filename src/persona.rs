//! The advisory persona: the fixed system instruction, the canned example
//! questions and the frameworks the advisor is meant to cover.

/// An out-of-band directive sent with every completion request. It is
/// never stored in a `Conversation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SystemInstruction(&'static str);

impl SystemInstruction {
    pub(crate) const fn new(text: &'static str) -> SystemInstruction {
        SystemInstruction(text)
    }

    pub(crate) fn as_str(&self) -> &'static str {
        self.0
    }
}

pub(crate) const SYSTEM_INSTRUCTION: SystemInstruction = SystemInstruction::new(
    "You are a senior government compliance expert with deep expertise in NIST 800-53, \
     NIST 800-171, FedRAMP, FISMA, OMB Circulars, TIC 3.0, and Zero Trust architecture. \
     Provide detailed, actionable guidance that helps organizations achieve and maintain \
     compliance. Include specific control references when relevant and practical \
     implementation advice.",
);

/// A canned question offered to new users
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub(crate) struct ExampleQuestion {
    /// Short label shown in listings
    pub label: &'static str,
    /// The full query submitted to the model
    pub query: &'static str,
}

pub(crate) const EXAMPLE_QUESTIONS: [ExampleQuestion; 3] = [
    ExampleQuestion {
        label: "What is NIST 800-53?",
        query: "What is NIST 800-53 and what are its main control families?",
    },
    ExampleQuestion {
        label: "FedRAMP Requirements",
        query: "What are the key FedRAMP authorization requirements for cloud services?",
    },
    ExampleQuestion {
        label: "Cloud Migration Help",
        query: "I'm migrating a financial system to AWS for a government agency. \
                What compliance frameworks should I consider?",
    },
];

/// Looks up an example by its 1-based position, as shown to the user
pub(crate) fn example(number: usize) -> Option<&'static ExampleQuestion> {
    number.checked_sub(1).and_then(|i| EXAMPLE_QUESTIONS.get(i))
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub(crate) struct Framework {
    pub name: &'static str,
    pub focus: &'static str,
}

pub(crate) const SUPPORTED_FRAMEWORKS: [Framework; 7] = [
    Framework {
        name: "NIST 800-53",
        focus: "Security Controls",
    },
    Framework {
        name: "NIST 800-171",
        focus: "CUI Protection",
    },
    Framework {
        name: "FedRAMP",
        focus: "Cloud Authorization",
    },
    Framework {
        name: "FISMA",
        focus: "Federal Security",
    },
    Framework {
        name: "OMB Circulars",
        focus: "Federal Policy",
    },
    Framework {
        name: "TIC 3.0",
        focus: "Trusted Internet",
    },
    Framework {
        name: "Zero Trust",
        focus: "Architecture",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_lookup_is_one_based() {
        assert!(example(0).is_none());
        assert_eq!(example(1).unwrap().label, "What is NIST 800-53?");
        assert_eq!(example(3).unwrap().label, "Cloud Migration Help");
        assert!(example(4).is_none());
    }

    #[test]
    fn test_system_instruction_names_every_framework() {
        for framework in SUPPORTED_FRAMEWORKS.iter() {
            assert!(
                SYSTEM_INSTRUCTION.as_str().contains(framework.name),
                "{} is missing from the system instruction",
                framework.name
            );
        }
    }
}
