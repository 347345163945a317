use rand::seq::SliceRandom;
use rand::Rng;

/// A multiple-choice quiz question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizQuestion {
    pub prompt: &'static str,
    pub choices: &'static [&'static str],
    pub correct: usize,
}

pub const MISSIONS: &[&str] = &[
    "Відмовся від пластикової пляшки сьогодні",
    "Вимкни непотрібне світло в кімнаті",
    "Скористайся громадським транспортом",
    "Збери сміття на вулиці",
    "Посади квітку або дерево",
    "Відсортуй відходи",
    "З'їж вегетаріанський обід",
    "Візьми до магазину власну торбинку",
    "Користуйся багаторазовою пляшкою для води",
    "Провітри кімнату замість кондиціонера",
    "Не друкуй зайвих паперів сьогодні",
    "Прогуляйся до найближчого парку",
];

pub const FACTS: &[&str] = &[
    "Україна має понад 70 тисяч річок і струмків.",
    "У Карпатах росте понад 100 видів лікарських рослин.",
    "У заповіднику Асканія-Нова живе понад 200 видів птахів.",
    "Шацькі озера - це понад 30 озер з кришталево чистою водою.",
    "В Україні зареєстровано понад 400 видів птахів.",
    "Біля Херсона розкинулась піщана пустеля - Олешківські піски.",
    "На півдні України можна зустріти рожевих фламінго.",
];

pub const QUIZ: &[QuizQuestion] = &[
    QuizQuestion {
        prompt: "Яка найвища гора в Україні?",
        choices: &["Говерла", "Піп Іван", "Бребенескуль", "Свидовець"],
        correct: 0,
    },
    QuizQuestion {
        prompt: "Яке море омиває південь України?",
        choices: &["Біле", "Чорне", "Балтійське", "Баренцове"],
        correct: 1,
    },
    QuizQuestion {
        prompt: "Яка річка найдовша в Україні?",
        choices: &["Дніпро", "Південний Буг", "Дністер", "Сіверський Донець"],
        correct: 0,
    },
];

/// Uniformly picks one item, or `None` for an empty list.
pub fn pick_random<'a, T, R>(items: &'a [T], rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    items.choose(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_pick_random_empty_list() {
        let mut rng = StdRng::seed_from_u64(1);
        let empty: [&str; 0] = [];
        assert!(pick_random(&empty, &mut rng).is_none());
    }

    #[test]
    fn test_pick_random_is_deterministic_with_seed() {
        let first = pick_random(MISSIONS, &mut StdRng::seed_from_u64(42));
        let second = pick_random(MISSIONS, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
        assert!(first.is_some());
    }

    #[test]
    fn test_quiz_correct_indices_are_in_range() {
        for question in QUIZ {
            assert!(question.correct < question.choices.len(), "{}", question.prompt);
        }
    }
}
