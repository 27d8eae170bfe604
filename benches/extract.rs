//! Benchmarks for report extraction.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use sentiment_lens::report::{
    AnalysisResult, FilterCriteria, Severity, Workflow, filter_report, normalize,
    parse_agent_sections, parse_email_records, parse_sentiment_score,
};

const SECTION: &str = "\
📡 Monitor Agent results
Found 120 real mentions across Reddit and X, 4 critical.

😊 Sentiment Analyzer results
Overall sentiment: 38/100. Negative tone around the outage, some positive notes on support.

🎯 Priority Ranker results
Urgency: 8. Login outage first, refund backlog second.

🔍 Context Investigator results
Systemic billing issue since the last release.

📧 Response Coordinator results
EMAIL 1:
Department: PR
To: pr@acme.com
Subject: Holding statement
Priority: CRITICAL
Body: Please publish the holding statement within the hour.
EMAIL 2:
Department: Support
To: support@acme.com
Subject: Refund macro
Priority: HIGH
Body: Update the refund macro and brief the night shift.

EXECUTIVE INSIGHTS
1. EXECUTIVE SUMMARY: Outage drove a sharp drop in sentiment.
2. IMMEDIATE ACTION ITEMS:
- Restore login
3. KEY TRENDS:
- Complaints concentrated on X
4. STRATEGIC RECOMMENDATIONS:
- Invest in redundancy
5. RISK ASSESSMENT: HIGH
6. OPPORTUNITIES:
- Proactive credits
";

fn deep_report() -> String {
    SECTION.repeat(8)
}

fn bench_agent_sections(c: &mut Criterion) {
    let report = deep_report();
    c.bench_function("agent_sections", |bench| {
        bench.iter(|| black_box(parse_agent_sections(black_box(&report))))
    });
}

fn bench_emails(c: &mut Criterion) {
    let report = deep_report();
    c.bench_function("email_records", |bench| {
        bench.iter(|| black_box(parse_email_records(black_box(&report))))
    });
}

fn bench_sentiment_fallback(c: &mut Criterion) {
    let report = "negative good excellent crisis satisfied ".repeat(200);
    c.bench_function("sentiment_keyword_ratio", |bench| {
        bench.iter(|| black_box(parse_sentiment_score(black_box(&report))))
    });
}

fn bench_filter(c: &mut Criterion) {
    let report = deep_report();
    let criteria = FilterCriteria {
        keyword: "refund outage".into(),
        severity: Severity::High,
        ..Default::default()
    };
    c.bench_function("filter_report", |bench| {
        bench.iter(|| black_box(filter_report(black_box(&report), &criteria)))
    });
}

fn bench_normalize(c: &mut Criterion) {
    let result = AnalysisResult::new("Acme", Workflow::Deep, deep_report());
    c.bench_function("normalize_deep", |bench| {
        bench.iter(|| black_box(normalize(black_box(&result))))
    });
}

criterion_group!(
    benches,
    bench_agent_sections,
    bench_emails,
    bench_sentiment_fallback,
    bench_filter,
    bench_normalize
);
criterion_main!(benches);
