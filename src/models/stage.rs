use std::fmt;

/// One logical section of the architecture document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    /// 1-based position in the final document
    pub number: usize,
    pub title: &'static str,
    /// Points the section must cover
    pub points: &'static [&'static str],
}

/// The ten sections of a solution architecture document, in order
pub const SECTIONS: [Section; 10] = [
    Section {
        number: 1,
        title: "Executive Summary",
        points: &[
            "Brief overview of the solution",
            "Key architectural decisions",
        ],
    },
    Section {
        number: 2,
        title: "Architecture Diagrams",
        points: &[
            "At least 2 diagrams: System Architecture Diagram and Deployment Architecture Diagram",
            "Each diagram under its own ### heading, in a ```mermaid block",
        ],
    },
    Section {
        number: 3,
        title: "Architecture Pattern & Reasoning",
        points: &[
            "Chosen pattern (Microservices, Monolithic, Event-Driven, etc.)",
            "Detailed reasoning for this choice",
            "Alternative patterns considered and why they were rejected",
        ],
    },
    Section {
        number: 4,
        title: "System Components",
        points: &[
            "Component name and purpose",
            "Suggested technology/framework",
            "Detailed reasoning for technology choice",
            "Interactions with other components",
        ],
    },
    Section {
        number: 5,
        title: "Technology Stack",
        points: &[
            "Frontend technologies with reasoning",
            "Backend technologies with reasoning",
            "Database choices with reasoning",
            "Infrastructure and DevOps tools",
        ],
    },
    Section {
        number: 6,
        title: "Data Architecture",
        points: &[
            "Data storage strategy",
            "Data flow between components",
            "Caching strategy",
        ],
    },
    Section {
        number: 7,
        title: "Non-Functional Requirements",
        points: &[
            "Scalability approach and reasoning",
            "Security measures and reasoning",
            "Performance optimization strategies",
            "Reliability and fault tolerance",
        ],
    },
    Section {
        number: 8,
        title: "Deployment Strategy",
        points: &[
            "Deployment architecture",
            "CI/CD pipeline approach",
            "Environment strategy",
        ],
    },
    Section {
        number: 9,
        title: "Integration Points",
        points: &[
            "External system integrations",
            "API design approach",
            "Authentication/Authorization strategy",
        ],
    },
    Section {
        number: 10,
        title: "Trade-offs and Decisions",
        points: &[
            "Key trade-offs made",
            "Risks and mitigation strategies",
            "Future scalability considerations",
        ],
    },
];

/// A bounded generation request producing a fixed subset of sections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Executive summary and diagrams
    Overview,
    /// Pattern, components, stack, data, NFRs
    Design,
    /// Deployment, integration, trade-offs
    Delivery,
}

impl Stage {
    /// All stages in execution order
    pub const ALL: [Stage; 3] = [Stage::Overview, Stage::Design, Stage::Delivery];

    pub fn number(&self) -> usize {
        match self {
            Stage::Overview => 1,
            Stage::Design => 2,
            Stage::Delivery => 3,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Stage::Overview => "Overview & Diagrams",
            Stage::Design => "Design Details",
            Stage::Delivery => "Delivery & Trade-offs",
        }
    }

    pub fn sections(&self) -> &'static [Section] {
        match self {
            Stage::Overview => &SECTIONS[0..2],
            Stage::Design => &SECTIONS[2..7],
            Stage::Delivery => &SECTIONS[7..10],
        }
    }

    /// Sections owned by earlier stages
    pub fn preceding_sections(&self) -> &'static [Section] {
        match self {
            Stage::Overview => &SECTIONS[0..0],
            Stage::Design => &SECTIONS[0..2],
            Stage::Delivery => &SECTIONS[0..7],
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stage {}: {}", self.number(), self.title())
    }
}
