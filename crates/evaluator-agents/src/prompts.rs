//! Prompt builders for every node of both evaluation graphs, plus literature
//! query planning.
//!
//! Prompt versioning: bump `PROMPT_VERSION` whenever prompt content changes.
//! The version is logged with every run so a score can be traced back to the
//! wording that produced it.
//!
//! The debate prompts form three structurally identical families, one per
//! [`EvaluationMetric`]; only the [`MetricBrief`] differs between them.

use assessment::debate::{EvaluationMetric, VERDICT_MARKER};
use assessment::literature::queries::{MAX_QUERIES, MAX_QUERY_WORDS};

/// Prompt version. Bump on any prompt content change.
pub const PROMPT_VERSION: &str = "1.3.0";

// ── Literature search ────────────────────────────────────────────────────────

/// Ask for keyword queries that will surface prior work for `proposal`.
pub fn query_generation(proposal: &str) -> String {
    format!(
        "You are an expert at constructing precise academic search queries for Semantic Scholar.

Research proposal: {proposal}

Identify the research question, the problem domain, the key methods and the claimed novelty,
then generate {MAX_QUERIES} diverse search queries that find the closest prior work.

Rules:
1. Keep queries SHORT: 2-6 words, never more than {MAX_QUERY_WORDS}
2. Use technical terms, not natural-language questions
3. Combine 2-3 concepts maximum per query
4. NO boolean operators, quotes or minus signs
5. Prioritize precision over recall

For each query give the query string, a one-sentence rationale and the proposal concepts it targets.
Order the queries from most to least important."
    )
}

// ── Linear family ────────────────────────────────────────────────────────────

pub fn planning(proposal: &str, paper_count: usize) -> String {
    format!(
        "Given this research proposal: {proposal}

Available retrieved papers: {paper_count} papers

Create a step-by-step plan to evaluate its novelty and feasibility using the already retrieved papers.
Focus on:
1. Analyzing overlaps with existing methods
2. Identifying unique contributions
3. Assessing technical feasibility

Return just the plan as a string."
    )
}

pub fn investigation(plan: &str, findings: &[String], iteration: u32) -> String {
    format!(
        "Current plan: {plan}
Findings so far: {findings}
Current iteration: {iteration}

You have access to pre-retrieved papers. Based on the plan and current findings, what should you analyze next?
Choose one:
1. Analyze papers for specific aspects (respond with: \"TOOL: analyze_papers, FOCUS: <aspect to focus on>\")
2. Extract technical details (respond with: \"TOOL: extract_details, CRITERIA: <what to extract>\")
3. Compare methodologies (respond with: \"TOOL: compare_methods, ASPECT: <methodology aspect>\")
4. Conclude investigation (respond with: \"CONCLUDE\")

Respond in the exact format specified above.",
        findings = render_findings(findings),
    )
}

/// Investigation prompt for tagged JSON decisions.
pub fn investigation_structured(plan: &str, findings: &[String], iteration: u32) -> String {
    format!(
        "Current plan: {plan}
Findings so far: {findings}
Current iteration: {iteration}

You have access to pre-retrieved papers. Based on the plan and current findings, decide what to analyze next.
Either use one tool or conclude:
- analyze_papers: analyze the papers for a specific aspect (parameter: the aspect to focus on)
- extract_details: extract technical details (parameter: what to extract)
- compare_methods: compare methodologies (parameter: the methodology aspect)
- conclude: enough evidence has been gathered",
        findings = render_findings(findings),
    )
}

pub fn reflection(findings: &[String], iteration: u32) -> String {
    format!(
        "Findings so far: {findings}
Current iteration: {iteration}

Based on your analysis of the retrieved papers, evaluate the confidence level (0-100) for each aspect:
- Novelty assessment confidence (how well you understand what's new)
- Feasibility assessment confidence (how realistic the implementation seems)
- Overall investigation completeness (do you have enough information)

Return a JSON-like response on the FIRST line:
{{\"novelty\": <score>, \"feasibility\": <score>, \"overall\": <score>}}

Then decide: Should I continue investigating (if overall < 75) or conclude?
Add on a new line: CONTINUE or CONCLUDE",
        findings = render_findings(findings),
    )
}

/// Reflection prompt for a JSON confidence report.
pub fn reflection_structured(findings: &[String], iteration: u32) -> String {
    format!(
        "Findings so far: {findings}
Current iteration: {iteration}

Based on your analysis of the retrieved papers, report your confidence (0-100) in the novelty
assessment, in the feasibility assessment, and in the overall completeness of the investigation.
Also state whether you would continue investigating or conclude.",
        findings = render_findings(findings),
    )
}

pub fn linear_scoring(findings: &[String], confidence: &str) -> String {
    format!(
        "Based on analysis of retrieved papers and findings: {findings}
Confidence levels: {confidence}

Generate final evaluation scores (1-10) for:
- Novelty: How new/original is this idea compared to retrieved papers?
- Feasibility: How realistic is implementation based on similar work?
- Impact: Potential significance of results based on the literature?

Provide a recommendation (Accept, Revise or Reject) based on the paper analysis and a brief
summary explaining the reasoning behind the recommendation.",
        findings = render_findings(findings),
    )
}

/// Findings as a bracketed, quoted list.
fn render_findings(findings: &[String]) -> String {
    let quoted: Vec<String> = findings.iter().map(|f| format!("{f:?}")).collect();
    format!("[{}]", quoted.join(", "))
}

// ── Debate family ────────────────────────────────────────────────────────────

/// Topic-specific content that distinguishes one debate family from another.
#[derive(Debug, Clone, Copy)]
pub struct MetricBrief {
    pub metric: EvaluationMetric,
    /// Noun phrase the debate is about.
    pub subject: &'static str,
    /// What the advocate should stress.
    pub advocate_focus: [&'static str; 3],
    /// What the skeptic should attack.
    pub skeptic_focus: [&'static str; 3],
    /// Rating statements the verdict should speak to.
    pub rubric: &'static [&'static str],
}

const NOVELTY: MetricBrief = MetricBrief {
    metric: EvaluationMetric::Novelty,
    subject: "novelty",
    advocate_focus: [
        "Unique contributions the idea makes.",
        "How it improves upon existing methods (referencing the papers).",
        "New perspectives or connections between fields it introduces.",
    ],
    skeptic_focus: [
        "Overlaps with existing work (cite specific papers).",
        "Parts that are only incremental improvements.",
        "Why the idea might not be as novel as claimed.",
    ],
    rubric: &[
        "The research idea proposes novel methods, models, applications, or explores new directions rather than making only incremental improvements to existing work.",
        "The idea provides unique perspectives, theoretical insights, or connects disparate fields in valuable ways.",
        "The research idea is novel.",
    ],
};

const FEASIBILITY: MetricBrief = MetricBrief {
    metric: EvaluationMetric::Feasibility,
    subject: "feasibility",
    advocate_focus: [
        "Resources (datasets, tools, software, equipment) that are available for the work.",
        "Similar work in the papers that shows the approach can be executed.",
        "Why the scope fits a standard research timeframe.",
    ],
    skeptic_focus: [
        "Technical challenges or flaws that could block the work.",
        "Specialized or rare expertise the work depends on.",
        "Why the scope or complexity may exceed a realistic timeframe.",
    ],
    rubric: &[
        "The required resources (datasets, tools, software, equipment) are commonly available or publicly accessible.",
        "The idea requires highly specialized or rare expertise that may be difficult to access.",
        "The work can reasonably be completed within a standard research timeframe (6-24 months).",
        "The research idea is feasible.",
    ],
};

const INTERESTINGNESS: MetricBrief = MetricBrief {
    metric: EvaluationMetric::Interestingness,
    subject: "interestingness",
    advocate_focus: [
        "Alignment with current priorities and themes in the field.",
        "Real-world problems or applications that matter beyond academia.",
        "Why the potential impact outweighs the risks.",
    ],
    skeptic_focus: [
        "Reasons the field may not care about this problem now.",
        "Limited reach of the results beyond a narrow niche.",
        "Why the impact might be smaller than claimed.",
    ],
    rubric: &[
        "The research idea aligns with current priorities, themes, or calls from major funding agencies and scientific organizations in this field.",
        "The idea addresses real-world problems or applications that matter beyond academia.",
        "The research idea is interesting.",
    ],
};

/// Brief for the family selected by `metric`.
pub fn brief(metric: EvaluationMetric) -> &'static MetricBrief {
    match metric {
        EvaluationMetric::Novelty => &NOVELTY,
        EvaluationMetric::Feasibility => &FEASIBILITY,
        EvaluationMetric::Interestingness => &INTERESTINGNESS,
    }
}

fn numbered(items: &[&str]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {item}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn advocate(metric: EvaluationMetric, idea: &str, literature: &str, history: &str) -> String {
    let brief = brief(metric);
    format!(
        "You are the ADVOCATE for the proposed research idea.
Your goal is to defend the {subject} of the idea and explain why it holds up.
Use the provided retrieved papers to support your arguments.
Focus on:
{focus}

Research Idea:
{idea}

Retrieved Papers:
{literature}

Previous Discussion:
{history}

Provide a strong, evidence-based argument in favor of the idea's {subject}.",
        subject = brief.subject,
        focus = numbered(&brief.advocate_focus),
    )
}

pub fn skeptic(metric: EvaluationMetric, idea: &str, literature: &str, history: &str) -> String {
    let brief = brief(metric);
    format!(
        "You are the SKEPTIC of the proposed research idea.
Your goal is to critique the {subject} of the idea and point out its weaknesses.
Use the provided retrieved papers to show similarity to prior work or identify weaknesses.
Focus on:
{focus}

Research Idea:
{idea}

Retrieved Papers:
{literature}

Previous Discussion:
{history}

Provide a critical, evidence-based counter-argument about the idea's {subject}.",
        subject = brief.subject,
        focus = numbered(&brief.skeptic_focus),
    )
}

pub fn moderator(
    metric: EvaluationMetric,
    idea: &str,
    literature: &str,
    history: &str,
    iteration: u32,
    max_iterations: u32,
) -> String {
    let brief = brief(metric);
    format!(
        "You are the MODERATOR (Expert) guiding a debate between an Advocate and a Skeptic about the {subject} of a research idea.
Your goal is to synthesize the arguments, ask probing questions, and keep the discussion grounded in the literature.

Research Idea:
{idea}

Retrieved Papers:
{literature}

Previous Discussion:
{history}

Current Iteration: {iteration} / {max_iterations}

Statements the final verdict should speak to:
{rubric}

Task:
1. Summarize the key points made by both sides so far.
2. If the maximum iterations have been reached or the discussion has converged, give a FINAL VERDICT on the idea's {subject}. Put it on its own line starting with \"{VERDICT_MARKER}\".
3. Otherwise ask one specific, probing question to guide the next round of debate.",
        subject = brief.subject,
        rubric = numbered(brief.rubric),
    )
}

/// Moderator prompt for a JSON ruling.
pub fn moderator_structured(
    metric: EvaluationMetric,
    idea: &str,
    literature: &str,
    history: &str,
    iteration: u32,
    max_iterations: u32,
) -> String {
    let brief = brief(metric);
    format!(
        "You are the MODERATOR (Expert) guiding a debate between an Advocate and a Skeptic about the {subject} of a research idea.

Research Idea:
{idea}

Retrieved Papers:
{literature}

Previous Discussion:
{history}

Current Iteration: {iteration} / {max_iterations}

Statements the final verdict should speak to:
{rubric}

Put a summary of both sides in `synthesis`. If the maximum iterations have been reached or the
discussion has converged, put your final verdict on the idea's {subject} in `verdict`. Otherwise
leave `verdict` empty and end the synthesis with one probing question for the next round.",
        subject = brief.subject,
        rubric = numbered(brief.rubric),
    )
}

pub fn debate_scoring(metric: EvaluationMetric, final_message: &str) -> String {
    let brief = brief(metric);
    format!(
        "Below is the moderator's final message from a debate about the {subject} of a research idea:

{final_message}

Based on this message, generate final evaluation scores (1-10) for:
- Novelty: How new/original is this idea compared to the literature?
- Feasibility: How realistic is implementation based on similar work?
- Impact: Potential significance of results?

Weigh the {subject} discussion most heavily. Provide a recommendation (Accept, Revise or Reject)
and a brief summary explaining the reasoning behind it.",
        subject = brief.subject,
    )
}
