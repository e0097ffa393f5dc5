use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::{Catalog, CatalogEntry, Category};
use crate::quiz;

pub const OPTIONS_PER_QUESTION: usize = 4;
pub const QUESTIONS_PER_SESSION: usize = 10;

/// Every question the catalog can produce: two per planet (description and
/// fun fact) and one per mission.
pub fn generate_question_pool<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> Vec<quiz::Question> {
    let planets = catalog.entries(Category::Planet);
    let missions = catalog.entries(Category::Mission);

    let mut pool = Vec::with_capacity(planets.len() * 2 + missions.len());

    for planet in planets {
        let prompt = format!("Which planet is {}?", embed(&planet.description));
        pool.extend(build_question(prompt, planet, planets, rng));
    }
    for mission in missions {
        let prompt = format!("Which mission is this? {}.", sentence(&mission.description));
        pool.extend(build_question(prompt, mission, missions, rng));
    }
    for planet in planets {
        let prompt = format!("Which planet {}?", embed(&planet.fun_fact));
        pool.extend(build_question(prompt, planet, planets, rng));
    }

    pool
}

/// A shuffled selection of at most [`QUESTIONS_PER_SESSION`] questions.
pub fn sample_questions<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> Vec<quiz::Question> {
    let mut pool = generate_question_pool(catalog, rng);
    pool.shuffle(rng);
    pool.truncate(QUESTIONS_PER_SESSION);
    pool
}

pub fn new_session<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> quiz::QuizSession {
    quiz::QuizSession::new(sample_questions(catalog, rng))
}

// Options are capped at the category size. A category with a single member
// cannot produce a multiple-choice question at all.
fn build_question<R: Rng + ?Sized>(
    prompt: String,
    subject: &CatalogEntry,
    siblings: &[CatalogEntry],
    rng: &mut R,
) -> Option<quiz::Question> {
    let distractors = pick_distractors(siblings, &subject.name, OPTIONS_PER_QUESTION - 1, rng);
    if distractors.is_empty() {
        log::debug!("Skipping question about {:?}: no distractors", subject.name);
        return None;
    }

    // We shuffle the answers so the correct one isn't always the first one
    let answers = {
        let mut shuffled_answers = vec![quiz::Answer::new(subject.name.clone(), true)];
        shuffled_answers.extend(
            distractors
                .into_iter()
                .map(|name| quiz::Answer::new(name, false)),
        );
        shuffled_answers.shuffle(rng);
        shuffled_answers
    };

    Some(quiz::Question::new(prompt, answers))
}

fn pick_distractors<R: Rng + ?Sized>(
    siblings: &[CatalogEntry],
    exclude: &str,
    count: usize,
    rng: &mut R,
) -> Vec<String> {
    let mut candidates = siblings
        .iter()
        .map(|e| e.name.as_str())
        .filter(|name| *name != exclude)
        .collect::<Vec<_>>();
    candidates.sort_unstable();
    candidates.dedup();

    candidates
        .choose_multiple(rng, count)
        .map(|name| name.to_string())
        .collect()
}

fn sentence(text: &str) -> &str {
    text.trim().trim_end_matches(['.', '!', '?'])
}

// "Known as the Red Planet" -> "known as the Red Planet", without trailing punctuation.
fn embed(text: &str) -> String {
    let mut chars = sentence(text).chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn entry(name: &str) -> CatalogEntry {
        CatalogEntry {
            name: name.to_string(),
            description: format!("The {name} description"),
            fun_fact: format!("Has a fact about {name}."),
            image_url: String::new(),
        }
    }

    fn catalog(planets: &[&str], missions: &[&str]) -> Catalog {
        Catalog::new(
            planets.iter().map(|n| entry(n)).collect(),
            missions.iter().map(|n| entry(n)).collect(),
        )
        .unwrap()
    }

    fn assert_well_formed(question: &quiz::Question) {
        let options: Vec<&str> = question.options().collect();
        let unique: HashSet<&str> = options.iter().copied().collect();
        assert_eq!(unique.len(), options.len(), "duplicate options in {question:?}");

        let correct: Vec<&quiz::Answer> = question.answers.iter().filter(|a| a.is_correct).collect();
        assert_eq!(correct.len(), 1, "expected exactly one correct answer in {question:?}");
        assert!(question.has_option(&correct[0].text));
    }

    #[test]
    fn every_question_has_one_correct_answer_and_unique_options() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            for question in generate_question_pool(&Catalog::solar_system(), &mut rng) {
                assert_well_formed(&question);
            }
        }
    }

    #[test]
    fn builtin_catalog_yields_four_options_for_every_planet() {
        let mut rng = StdRng::seed_from_u64(42);
        let catalog = Catalog::solar_system();
        let pool = generate_question_pool(&catalog, &mut rng);

        // 8 planets * 2 + 4 missions
        assert_eq!(pool.len(), 20);
        assert!(pool.iter().all(|q| q.answers.len() == OPTIONS_PER_QUESTION));

        let answered: HashSet<&str> = pool.iter().filter_map(|q| q.correct_answer()).collect();
        for planet in catalog.planets() {
            assert!(answered.contains(planet.name.as_str()), "no question for {}", planet.name);
        }
    }

    #[test]
    fn distractors_stay_within_category() {
        let mut rng = StdRng::seed_from_u64(3);
        let catalog = Catalog::solar_system();
        let planet_names: HashSet<&str> = catalog.planets().iter().map(|p| p.name.as_str()).collect();

        for question in generate_question_pool(&catalog, &mut rng) {
            let is_planet_question = question.text.starts_with("Which planet");
            for option in question.options() {
                assert_eq!(planet_names.contains(option), is_planet_question);
            }
        }
    }

    #[test]
    fn prompts_embed_catalog_text() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool = generate_question_pool(&Catalog::solar_system(), &mut rng);
        let prompts: Vec<&str> = pool.iter().map(|q| q.text.as_str()).collect();

        assert!(prompts.contains(&"Which planet is known as the Red Planet?"));
        assert!(prompts.contains(&"Which planet rotates backwards compared to most other planets?"));
        assert!(prompts.contains(&"Which mission is this? First human Moon landing mission."));
    }

    #[test]
    fn session_has_ten_distinct_prompts() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..50 {
            let questions = sample_questions(&Catalog::solar_system(), &mut rng);
            assert_eq!(questions.len(), QUESTIONS_PER_SESSION);
            let prompts: HashSet<&str> = questions.iter().map(|q| q.text.as_str()).collect();
            assert_eq!(prompts.len(), questions.len());
        }
    }

    #[test]
    fn small_pool_yields_short_session() {
        let mut rng = StdRng::seed_from_u64(5);
        let questions = sample_questions(&catalog(&["Mars", "Venus"], &[]), &mut rng);
        assert_eq!(questions.len(), 4);
        assert!(questions.iter().all(|q| q.answers.len() == 2));
        questions.iter().for_each(assert_well_formed);
    }

    #[test]
    fn options_are_capped_by_category_size() {
        let mut rng = StdRng::seed_from_u64(11);
        let pool = generate_question_pool(&catalog(&["A", "B", "C", "D", "E"], &["X", "Y", "Z"]), &mut rng);

        for question in &pool {
            let expected = if question.text.starts_with("Which mission") { 3 } else { 4 };
            assert_eq!(question.answers.len(), expected);
            assert_well_formed(question);
        }
    }

    #[test]
    fn single_member_category_produces_no_questions() {
        let mut rng = StdRng::seed_from_u64(13);
        let pool = generate_question_pool(&catalog(&["Mars"], &["Apollo 11"]), &mut rng);
        assert!(pool.is_empty());

        let session = new_session(&catalog(&["Mars"], &[]), &mut rng);
        assert!(session.is_complete());
    }

    #[test]
    fn embed_lowercases_first_letter_and_trims_punctuation() {
        assert_eq!(embed("Known as the Red Planet"), "known as the Red Planet");
        assert_eq!(embed("Has the shortest day of all the planets."), "has the shortest day of all the planets");
        assert_eq!(embed(""), "");
        assert_eq!(sentence("Farthest human-made object from Earth!"), "Farthest human-made object from Earth");
    }
}
