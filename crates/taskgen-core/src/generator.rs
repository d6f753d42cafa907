//! Rule-based expansion of a [`ProjectRequest`] into stories and tasks.
//!
//! All wording lives in the static tables below. The generator only decides
//! which tables apply and in what order they are concatenated; the order is
//! part of the output contract.

use crate::types::{GeneratedSpec, ProjectRequest, Template};

// ---------------------------------------------------------------------------
// Rule tables
// ---------------------------------------------------------------------------

/// A story line parameterized by `(users, goal)`.
type StoryRule = fn(&str, &str) -> String;

const BASE_STORIES: [StoryRule; 3] = [
    |users, goal| {
        format!("As a {users}, I want to {goal} so that I can achieve my objectives efficiently.")
    },
    |users, goal| {
        format!("As a {users}, I want to track the progress of {goal} so that I can stay informed.")
    },
    |users, goal| {
        format!(
            "As a {users}, I want to receive notifications about {goal} so that I don't miss important updates."
        )
    },
];

const BASE_TASKS: [&str; 12] = [
    "Set up project structure and development environment",
    "Design database schema and data models",
    "Create RESTful API endpoints for core functionality",
    "Implement user authentication and authorization",
    "Build responsive frontend components",
    "Add form validation and error handling",
    "Implement real-time updates using WebSockets",
    "Set up automated testing framework",
    "Configure CI/CD pipeline",
    "Add logging and monitoring capabilities",
    "Implement caching strategies for performance",
    "Create comprehensive documentation",
];

const CONSTRAINT_DOC_TASK: &str = "Create technical documentation for constraint compliance";

const RISK_FOLLOWUP_TASKS: [&str; 2] = [
    "Implement fallback mechanisms for identified risks",
    "Create contingency plans for risk mitigation",
];

/// Fixed sign-off block between the request-driven tasks and QA.
///
/// Always emitted. It brings the totals to the published 26 (no extras),
/// 28 (constraints), 29 (risks) and 31 (both); removing it breaks those
/// counts, which clients and `task_counts_cover_every_optional_combination`
/// depend on.
const ACCEPTANCE_TASKS: [&str; 2] = [
    "Conduct user acceptance testing with target users",
    "Review acceptance criteria against user stories",
];

const QA_TASKS: [&str; 4] = [
    "Perform load testing and performance optimization",
    "Conduct security audit and penetration testing",
    "Implement automated regression testing",
    "Set up error tracking and alerting",
];

const DEPLOYMENT_TASKS: [&str; 4] = [
    "Configure production environment",
    "Set up backup and disaster recovery",
    "Create deployment runbooks",
    "Plan for scalability and future enhancements",
];

/// The extra story and tasks contributed by one project template.
pub struct TemplateRules {
    story: StoryRule,
    pub tasks: [&'static str; 4],
}

impl TemplateRules {
    pub fn story(&self, users: &str, goal: &str) -> String {
        (self.story)(users, goal)
    }
}

static WEB_RULES: TemplateRules = TemplateRules {
    story: |users, goal| {
        format!(
            "As a {users}, I want {goal} to work seamlessly across different browsers so that I have a consistent experience."
        )
    },
    tasks: [
        "Ensure cross-browser compatibility",
        "Implement SEO best practices",
        "Optimize for search engine indexing",
        "Add progressive web app features",
    ],
};

static MOBILE_RULES: TemplateRules = TemplateRules {
    story: |users, goal| {
        format!(
            "As a {users}, I want to access {goal} on my mobile device so that I can use it on the go."
        )
    },
    tasks: [
        "Optimize touch interactions and gestures",
        "Implement offline functionality",
        "Design adaptive layouts for different screen sizes",
        "Handle mobile-specific permissions and features",
    ],
};

static INTERNAL_RULES: TemplateRules = TemplateRules {
    story: |users, goal| {
        format!(
            "As a {users}, I want {goal} to integrate with existing tools so that my workflow remains streamlined."
        )
    },
    tasks: [
        "Implement role-based access control",
        "Set up single sign-on (SSO) integration",
        "Create admin dashboard for management",
        "Add audit logging for compliance",
    ],
};

impl Template {
    pub fn rules(self) -> &'static TemplateRules {
        match self {
            Template::Web => &WEB_RULES,
            Template::Mobile => &MOBILE_RULES,
            Template::Internal => &INTERNAL_RULES,
        }
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Expand `request` into stories and tasks. Pure and deterministic; callers
/// validate required fields first.
pub fn generate(request: &ProjectRequest) -> GeneratedSpec {
    let users = request.users.as_str();
    let goal = request.goal.as_str();
    let rules = request.template_kind().map(Template::rules);

    let mut stories: Vec<String> = BASE_STORIES.iter().map(|s| s(users, goal)).collect();
    if let Some(r) = rules {
        stories.push(r.story(users, goal));
    }

    let mut tasks: Vec<String> = BASE_TASKS.iter().map(|t| t.to_string()).collect();
    if let Some(r) = rules {
        tasks.extend(r.tasks.iter().map(|t| t.to_string()));
    }

    // Optional text is inserted as given; only the presence check trims.
    if let Some(constraints) = request.constraints_text() {
        tasks.push(format!(
            "Analyze and implement solution within constraints: {constraints}"
        ));
        tasks.push(CONSTRAINT_DOC_TASK.to_string());
    }

    if let Some(risks) = request.risks_text() {
        tasks.push(format!("Conduct risk assessment for: {risks}"));
        tasks.extend(RISK_FOLLOWUP_TASKS.iter().map(|t| t.to_string()));
    }

    tasks.extend(ACCEPTANCE_TASKS.iter().map(|t| t.to_string()));
    tasks.extend(QA_TASKS.iter().map(|t| t.to_string()));
    tasks.extend(DEPLOYMENT_TASKS.iter().map(|t| t.to_string()));

    GeneratedSpec { stories, tasks }
}
