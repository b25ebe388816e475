use std::collections::HashMap;
use once_cell::sync::Lazy;

/// A practice word with three hints, hardest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PracticeCard {
    pub word: &'static str,
    pub hints: [&'static str; 3],
}

const fn card(word: &'static str, hints: [&'static str; 3]) -> PracticeCard {
    PracticeCard { word, hints }
}

/// Built-in practice decks keyed by language code
pub static PRACTICE_DECKS: Lazy<HashMap<&'static str, Vec<PracticeCard>>> = Lazy::new(|| {
    let mut decks = HashMap::new();

    decks.insert(
        "he",
        vec![
            card("חתול", [
                "בעל חיים שאוהב לטפס על עצים",
                "בעל חיים בבית שאומר מיאו",
                "חיית מחמד שצדה עכברים",
            ]),
            card("שמש", [
                "מקור האנרגיה של כדור הארץ",
                "הכוכב שנותן לנו אור ביום",
                "צהוב, חם, זורח בשמיים",
            ]),
            card("מכונית", [
                "כלי תחבורה עם מנוע בעירה פנימית",
                "רכב עם ארבעה גלגלים ומנוע",
                "מה שנוסעים בו על הכביש",
            ]),
            card("ספר", [
                "אוסף דפים כרוכים עם תוכן כתוב",
                "דבר שקורים בו סיפורים ומידע",
                "מה שלומדים ממנו בבית ספר",
            ]),
            card("עץ", [
                "אורגניזם רב-שנתי עם גזע ועלים",
                "צמח גבוה עם ענפים וגזע",
                "ירוק, גבוה, גדל ביער",
            ]),
            card("טלפון", [
                "מכשיר תקשורת אלקטרוני נייד",
                "מכשיר שמדברים בו למרחקים",
                "מה שמתקשרים בו לחברים",
            ]),
            card("מים", [
                "H2O במצב נוזלי",
                "נוזל שותים כשצמאים",
                "מה שזורם מהברז",
            ]),
            card("לחם", [
                "מוצר אפייה מקמח חיטה מותסס",
                "מזון בסיסי שאופים בתנור",
                "מה שאוכלים עם חמאה לארוחת בוקר",
            ]),
            card("כדור", [
                "עצם גיאומטרי תלת-ממדי עגול",
                "צורה עגולה ששוחקים בה",
                "עגול, קופץ, משחק איתו",
            ]),
            card("בית", [
                "מבנה מגורים עם קירות וגג",
                "מקום שגרים בו משפחות",
                "איפה שחוזרים לישון בלילה",
            ]),
        ],
    );

    decks.insert(
        "en",
        vec![
            card("cat", [
                "An animal that likes climbing trees",
                "A house pet that says meow",
                "The pet that hunts mice",
            ]),
            card("sun", [
                "The energy source of planet Earth",
                "The star that gives us daylight",
                "Yellow, hot, shines in the sky",
            ]),
            card("car", [
                "A vehicle with an internal combustion engine",
                "Four wheels and a motor",
                "What you drive on the road",
            ]),
            card("book", [
                "Bound pages of written content",
                "Something you read stories in",
                "What you study from at school",
            ]),
            card("tree", [
                "A perennial organism with a trunk and leaves",
                "A tall plant with branches",
                "Green, tall, grows in a forest",
            ]),
            card("phone", [
                "A portable electronic communication device",
                "A device for talking over long distances",
                "What you call your friends with",
            ]),
            card("water", [
                "H2O in liquid form",
                "The liquid you drink when thirsty",
                "What flows from the tap",
            ]),
            card("bread", [
                "A baked product of leavened wheat flour",
                "A staple food baked in an oven",
                "What you spread butter on at breakfast",
            ]),
            card("ball", [
                "A round three-dimensional solid",
                "A round shape used in games",
                "Round, bouncy, you play with it",
            ]),
            card("house", [
                "A dwelling with walls and a roof",
                "A place where families live",
                "Where you go back to sleep at night",
            ]),
        ],
    );

    decks
});

pub fn deck(language: &str) -> Option<&'static [PracticeCard]> {
    PRACTICE_DECKS.get(language).map(Vec::as_slice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decks_have_hints_for_every_card() {
        for (language, cards) in PRACTICE_DECKS.iter() {
            assert!(!cards.is_empty(), "deck {} is empty", language);
            for card in cards {
                assert!(card.hints.iter().all(|hint| !hint.is_empty()));
            }
        }
    }

    #[test]
    fn test_unknown_deck() {
        assert!(deck("en").is_some());
        assert!(deck("xx").is_none());
    }
}
