//! Startup reference dataset: 40 cost facts across the eight habit
//! categories, bulk-inserted once by the host application.

use tracing::info;

use crate::ChromaStore;

/// One reference fact to be embedded and stored at seed time.
#[derive(Debug, Clone, Copy)]
pub struct SeedFact {
    pub id: &'static str,
    pub content: &'static str,
    pub category: &'static str,
    pub source: &'static str,
    pub cost_type: &'static str,
}

const fn fact(
    id: &'static str,
    content: &'static str,
    category: &'static str,
    source: &'static str,
    cost_type: &'static str,
) -> SeedFact {
    SeedFact {
        id,
        content,
        category,
        source,
        cost_type,
    }
}

const SEED_FACTS: &[SeedFact] = &[
    // SMOKING
    fact("smoking_001", "A pack of cigarettes costs 4,500 on average", "SMOKING", "Ministry of Economy and Finance, 2024", "direct"),
    fact("smoking_002", "Each cigarette shortens life expectancy by about 11 minutes", "SMOKING", "WHO, 2020", "health"),
    fact("smoking_003", "Smokers spend about 500,000 more per year on medical care than non-smokers", "SMOKING", "National Health Insurance Service, 2023", "health"),
    fact("smoking_004", "Smoking raises lung cancer incidence 15-fold", "SMOKING", "Korean Association for Lung Cancer, 2022", "health"),
    fact("smoking_005", "Quitting smoking saves about 1,500,000 per year", "SMOKING", "Ministry of Health and Welfare, 2023", "direct"),
    // DRINKING
    fact("drinking_001", "A bottle of soju costs 5,000 on average", "DRINKING", "Statistics Korea, 2024", "direct"),
    fact("drinking_002", "Hangover-related productivity loss is about 30,000 per drinking occasion", "DRINKING", "Korea Institute for Health and Social Affairs, 2022", "opportunity"),
    fact("drinking_003", "Heavy drinkers spend about 400,000 more per year on medical care", "DRINKING", "National Health Insurance Service, 2023", "health"),
    fact("drinking_004", "Alcohol dependence treatment costs about 2,000,000 per year", "DRINKING", "Addiction Management Support Center, 2023", "health"),
    fact("drinking_005", "The minimum fine for drunk driving is 3,000,000", "DRINKING", "Road Traffic Act, 2024", "direct"),
    // EATING
    fact("eating_001", "The average food delivery order costs 15,000", "EATING", "Statistics Korea, 2023", "direct"),
    fact("eating_002", "Delivery or dining out costs about 10,000 more than cooking at home", "EATING", "Korea Consumer Agency, 2023", "direct"),
    fact("eating_003", "Obesity adds about 300,000 per year in extra medical costs", "EATING", "National Health Insurance Service, 2023", "health"),
    fact("eating_004", "Late-night eating degrades sleep quality by 30 percent", "EATING", "Korean Society of Sleep Medicine, 2022", "health"),
    fact("eating_005", "Treating indigestion from overeating costs about 20,000 per episode", "EATING", "Health Insurance Review and Assessment Service, 2023", "health"),
    // SPENDING
    fact("spending_001", "Koreans spend about 150,000 per month on impulse purchases on average", "SPENDING", "Korea Consumer Agency, 2023", "direct"),
    fact("spending_002", "78 percent of impulse purchases are later regretted", "SPENDING", "Korea Chamber of Commerce, 2023", "psychological"),
    fact("spending_003", "Unused subscription services average 30,000 per month", "SPENDING", "Financial Supervisory Service, 2023", "direct"),
    fact("spending_004", "Average annual interest on overdue credit cards is 15 percent", "SPENDING", "Credit Finance Association, 2024", "direct"),
    fact("spending_005", "Overspenders report stress levels 40 percent above average", "SPENDING", "Korean Psychological Association, 2022", "psychological"),
    // LAZINESS
    fact("laziness_001", "The 2024 minimum hourly wage is 9,860", "LAZINESS", "Ministry of Employment and Labor, 2024", "opportunity"),
    fact("laziness_002", "The average office worker earns about 25,000 per hour", "LAZINESS", "Statistics Korea, 2023", "opportunity"),
    fact("laziness_003", "Procrastination costs about 5,000,000 per year in lost productivity", "LAZINESS", "Korea Productivity Center, 2023", "opportunity"),
    fact("laziness_004", "Each instance of lateness costs about 20,000 on average", "LAZINESS", "Korea Employers Federation, 2022", "opportunity"),
    fact("laziness_005", "Sleep deprivation reduces work efficiency by 25 percent", "LAZINESS", "Korean Society of Sleep Medicine, 2022", "opportunity"),
    // DIGITAL
    fact("digital_001", "Koreans use smartphones 4 hours 23 minutes per day on average", "DIGITAL", "Ministry of Science and ICT, 2023", "opportunity"),
    fact("digital_002", "Heavy social media users report 30 percent more depressive feelings", "DIGITAL", "National Information Society Agency, 2023", "psychological"),
    fact("digital_003", "Average in-game spending is about 50,000 per month", "DIGITAL", "Korea Creative Content Agency, 2023", "direct"),
    fact("digital_004", "Smartphone overusers sleep 40 percent worse than average", "DIGITAL", "Korean Society of Sleep Medicine, 2022", "health"),
    fact("digital_005", "A digital detox improves productivity by 20 percent on average", "DIGITAL", "Korea Productivity Center, 2023", "opportunity"),
    // CAFFEINE
    fact("caffeine_001", "A cup of coffee costs 4,500 on average", "CAFFEINE", "Korea Consumer Agency, 2023", "direct"),
    fact("caffeine_002", "A can of energy drink costs 2,500 on average", "CAFFEINE", "Convenience store average, 2024", "direct"),
    fact("caffeine_003", "Excess caffeine raises anxiety disorder risk by 25 percent", "CAFFEINE", "Korean Neuropsychiatric Association, 2022", "health"),
    fact("caffeine_004", "Afternoon caffeine degrades sleep quality by 35 percent", "CAFFEINE", "Korean Society of Sleep Medicine, 2022", "health"),
    fact("caffeine_005", "Caffeine dependence adds about 10,000 per month in headache medication", "CAFFEINE", "Health Insurance Review and Assessment Service, 2023", "health"),
    // GAMBLING
    fact("gambling_001", "Gambling addicts lose about 2,000,000 per month on average", "GAMBLING", "Korea Center on Gambling Problems, 2023", "direct"),
    fact("gambling_002", "Gambling addiction treatment costs about 5,000,000 per year", "GAMBLING", "Addiction Management Support Center, 2023", "health"),
    fact("gambling_003", "Speculative stock trading loses individuals about 3,000,000 per year on average", "GAMBLING", "Financial Supervisory Service, 2023", "direct"),
    fact("gambling_004", "60 percent of gambling addicts experience family breakdown", "GAMBLING", "Korea Center on Gambling Problems, 2023", "psychological"),
    fact("gambling_005", "Resisting one gambling urge saves about 50,000 on average", "GAMBLING", "Addiction Management Support Center, 2023", "direct"),
];

/// The full startup dataset.
pub fn seed_facts() -> &'static [SeedFact] {
    SEED_FACTS
}

/// One-time bulk insert of the reference facts. Creates the collection if
/// needed, then upserts every fact; individual failures are logged inside
/// the store and do not stop the load.
pub async fn load_seed_data(store: &ChromaStore) {
    info!(count = SEED_FACTS.len(), "loading habit fact seed data");
    store.ensure_collection().await;
    for fact in SEED_FACTS {
        store.upsert(fact).await;
    }
    info!("habit fact seed data load finished");
}
