//! Canned replies for intents that never touch the store.

use rand::{Rng, seq::SliceRandom};

use super::format::{self, DayPeriod};

pub fn greeting(name: &str, period: DayPeriod, rng: &mut impl Rng) -> String {
    let pool = [
        format!(
            "{}, {name}! How can I help you manage your tasks today?",
            period.greeting()
        ),
        format!("Hey {name}! Ready to be productive? I'm here to help with your tasks and projects."),
        format!("Hi {name}! What would you like to accomplish today?"),
    ];
    pick(&pool, rng)
}

pub fn thanks(name: &str, rng: &mut impl Rng) -> String {
    let pool = [
        format!("You're welcome, {name}! Let me know if you need anything else."),
        "Happy to help! Is there anything else you'd like me to do?".to_string(),
        "Anytime! I'm here if you need more assistance.".to_string(),
    ];
    pick(&pool, rng)
}

pub fn help(name: &str) -> String {
    format::help_text(name)
}

pub fn unknown(name: &str, rng: &mut impl Rng) -> String {
    let pool = [
        format!("I'm not quite sure what you mean, {name}. Here's what I can help with:"),
        "Hmm, I didn't catch that. Let me show you what I can do:".to_string(),
        "I'd love to help! Here are some things you can ask me:".to_string(),
    ];
    format!("{}\n\n{}", pick(&pool, rng), format::QUICK_COMMANDS)
}

fn pick(pool: &[String], rng: &mut impl Rng) -> String {
    pool.choose(rng).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_greeting_mentions_name() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let reply = greeting("Ada", DayPeriod::Morning, &mut rng);
            assert!(reply.contains("Ada"), "{reply}");
        }
    }

    #[test]
    fn test_greeting_pool_uses_day_period() {
        let mut rng = StdRng::seed_from_u64(1);
        let replies: Vec<String> = (0..50)
            .map(|_| greeting("Ada", DayPeriod::Evening, &mut rng))
            .collect();
        assert!(replies.iter().any(|r| r.starts_with("Good evening, Ada!")));
        assert!(replies.iter().all(|r| !r.contains("Good morning")));
    }

    #[test]
    fn test_unknown_includes_quick_commands() {
        let mut rng = StdRng::seed_from_u64(3);
        let reply = unknown("there", &mut rng);
        assert!(reply.contains("**Quick Commands:**"));
        assert!(reply.ends_with("for the full list of commands!"));
    }

    #[test]
    fn test_help_addresses_caller() {
        assert!(help("Sam").starts_with("Here's what I can help you with, Sam:"));
    }
}
