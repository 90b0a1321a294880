use criterion::{black_box, criterion_group, criterion_main, Criterion};

use examgrade_core::model::{
    AcceptedAnswer, Answer, AnswerKey, Choice, MatchPair, Question, Response,
};
use examgrade_core::scorer::score;
use examgrade_core::statistics::compute_session_stats;
use examgrade_core::traits::GradeRecord;

fn choice(id: usize, is_correct: bool) -> Choice {
    Choice {
        id: format!("opt{id}"),
        text: String::new(),
        is_correct,
    }
}

fn make_select_question(options: usize) -> Question {
    Question {
        id: "bench".into(),
        prompt: String::new(),
        points: 10,
        key: AnswerKey::MultipleSelect {
            options: (0..options).map(|i| choice(i, i % 2 == 0)).collect(),
        },
    }
}

fn make_matching_question(pairs: usize) -> Question {
    Question {
        id: "bench".into(),
        prompt: String::new(),
        points: 10,
        key: AnswerKey::Matching {
            pairs: (0..pairs)
                .map(|i| MatchPair {
                    left: format!("left{i}"),
                    right: format!("right{i}"),
                })
                .collect(),
        },
    }
}

fn make_short_answer_question(keys: usize) -> Question {
    Question {
        id: "bench".into(),
        prompt: String::new(),
        points: 1,
        key: AnswerKey::ShortAnswer {
            accepted: (0..keys)
                .map(|i| AcceptedAnswer {
                    text: format!("answer number {i}"),
                    is_case_sensitive: false,
                })
                .collect(),
        },
    }
}

fn bench_scorers(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");

    let select_q = make_select_question(20);
    let select_a = Answer {
        question_id: "bench".into(),
        response: Response::Selection {
            selected: (0..10).map(|i| format!("opt{i}")).collect(),
        },
    };
    group.bench_function("multiple_select_20_options", |b| {
        b.iter(|| score(black_box(&select_a), black_box(&select_q)))
    });

    let match_q = make_matching_question(20);
    let match_a = Answer {
        question_id: "bench".into(),
        response: Response::Matching {
            matches: (0..20)
                .map(|i| (format!("left{i}"), format!("right{i}")))
                .collect(),
        },
    };
    group.bench_function("matching_20_pairs", |b| {
        b.iter(|| score(black_box(&match_a), black_box(&match_q)))
    });

    let short_q = make_short_answer_question(10);
    let short_a = Answer {
        question_id: "bench".into(),
        response: Response::Text {
            text: "  Answer Number 9  ".into(),
        },
    };
    group.bench_function("short_answer_10_keys", |b| {
        b.iter(|| score(black_box(&short_a), black_box(&short_q)))
    });

    group.finish();
}

fn bench_session_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_stats");

    let records: Vec<GradeRecord> = (0..100)
        .map(|i| {
            let q = make_select_question(8);
            let outcome = score(
                &Answer {
                    question_id: format!("q{i}"),
                    response: Response::Selection {
                        selected: vec![format!("opt{}", i % 8)],
                    },
                },
                &q,
            );
            GradeRecord {
                question_id: format!("q{i}"),
                kind: Some(q.kind()),
                points_awarded: outcome.points,
                points_possible: q.points,
                status: outcome.status,
                is_auto_graded: true,
            }
        })
        .collect();

    group.bench_function("100_records", |b| {
        b.iter(|| compute_session_stats(black_box(&records), black_box(Some(60.0))))
    });

    group.finish();
}

criterion_group!(benches, bench_scorers, bench_session_stats);
criterion_main!(benches);
