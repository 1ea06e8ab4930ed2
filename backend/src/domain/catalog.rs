//! Static game content: quests, toolkit articles and the daily challenge pool.
//!
//! The catalog is loaded once at startup and never mutated. Everything else
//! reads it: the progression engine needs the quest count for the
//! "Smart Investor" badge, the daily rotation picks from the challenge pool.

use once_cell::sync::Lazy;
use shared::{DailyChallenge, Difficulty, Quest, QuestCategory, QuestChoice, ToolkitItem};
use std::sync::Arc;

/// Version of the bundled content
pub const CATALOG_VERSION: &str = "2024.2";

static BUNDLED: Lazy<Arc<ContentCatalog>> = Lazy::new(|| {
    Arc::new(ContentCatalog::new(
        CATALOG_VERSION,
        bundled_quests(),
        bundled_toolkit(),
        bundled_daily_pool(),
    ))
});

#[derive(Debug, Clone, PartialEq)]
pub struct ContentCatalog {
    version: String,
    quests: Vec<Quest>,
    toolkit: Vec<ToolkitItem>,
    daily_pool: Vec<DailyChallenge>,
}

impl ContentCatalog {
    pub fn new(
        version: &str,
        quests: Vec<Quest>,
        toolkit: Vec<ToolkitItem>,
        daily_pool: Vec<DailyChallenge>,
    ) -> Self {
        Self {
            version: version.to_string(),
            quests,
            toolkit,
            daily_pool,
        }
    }

    /// The content shipped with the application
    pub fn bundled() -> Arc<ContentCatalog> {
        Arc::clone(&BUNDLED)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    pub fn quest(&self, quest_id: &str) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id == quest_id)
    }

    pub fn quest_count(&self) -> usize {
        self.quests.len()
    }

    pub fn toolkit(&self) -> &[ToolkitItem] {
        &self.toolkit
    }

    pub fn daily_pool(&self) -> &[DailyChallenge] {
        &self.daily_pool
    }
}

fn choice(text: &str, feedback: &str, xp_reward: i32, coin_reward: u32, health_delta: i32, is_correct: bool) -> QuestChoice {
    QuestChoice {
        text: text.to_string(),
        feedback: feedback.to_string(),
        xp_reward,
        coin_reward,
        health_delta,
        is_correct,
    }
}

#[allow(clippy::too_many_arguments)]
fn quest(
    id: &str,
    title: &str,
    category: QuestCategory,
    description: &str,
    scenario: &str,
    options: Vec<QuestChoice>,
    difficulty: Difficulty,
    reward_info: &str,
    icon: &str,
) -> Quest {
    Quest {
        id: id.to_string(),
        title: title.to_string(),
        category,
        description: description.to_string(),
        scenario: scenario.to_string(),
        options,
        difficulty,
        reward_info: reward_info.to_string(),
        icon: icon.to_string(),
    }
}

fn bundled_quests() -> Vec<Quest> {
    vec![
        quest(
            "q1",
            "Monthly Budget Basics",
            QuestCategory::Beginner,
            "Master the 50-30-20 rule for your first salary.",
            "You just received your first salary of ₹30,000. Your rent and bills are ₹15,000. You really want to buy a new pair of shoes for ₹5,000.",
            vec![
                choice(
                    "Buy the shoes immediately to celebrate!",
                    "Celebrating is good, but spending 16% of your salary on shoes before saving can lead to a debt trap.",
                    5, 0, -10, false,
                ),
                choice(
                    "Save ₹6,000 first, then see if you can afford the shoes.",
                    "Excellent! The \"Pay Yourself First\" rule (saving 20% first) is the foundation of wealth.",
                    50, 20, 15, true,
                ),
                choice(
                    "Put the shoes on a Credit Card EMI.",
                    "EMI for lifestyle items adds interest costs. It is better to save and buy.",
                    10, 5, -5, false,
                ),
            ],
            Difficulty::Easy,
            "50 XP • 20 Coins",
            "🧾",
        ),
        quest(
            "q2",
            "The UPI Scam Shield",
            QuestCategory::Digital,
            "Learn to identify fraudulent payment requests.",
            "You receive a WhatsApp message from \"KBC Rewards\" saying you won ₹25 Lakhs. They send a UPI QR code and ask you to scan it and enter your PIN to \"receive\" the prize.",
            vec![
                choice(
                    "Scan it immediately! It is a huge prize.",
                    "DANGER! Scanned QR codes are for PAYING, not receiving. You would have lost your money!",
                    0, 0, -30, false,
                ),
                choice(
                    "Report the number and delete the message.",
                    "Brilliant! Real prizes never require you to enter a UPI PIN to receive money. Stay safe!",
                    60, 30, 20, true,
                ),
            ],
            Difficulty::Medium,
            "60 XP • 30 Coins",
            "🛡",
        ),
        quest(
            "q3",
            "Emergency Fund Mission",
            QuestCategory::Beginner,
            "Prepare for the unexpected rainy day.",
            "Your laptop suddenly breaks down and repairs cost ₹10,000. You have ₹15,000 in your savings account.",
            vec![
                choice(
                    "Use your savings to fix it and start rebuilding.",
                    "Good use of savings, but this is why an Emergency Fund of 3-6 months of expenses is vital!",
                    40, 10, 10, true,
                ),
                choice(
                    "Take an instant high-interest personal loan.",
                    "Bad idea! Small loans for repairs often have predatory interest rates. Use your buffer instead.",
                    5, 0, -15, false,
                ),
            ],
            Difficulty::Easy,
            "40 XP • 10 Coins",
            "🚨",
        ),
        quest(
            "q4",
            "SIP Investing Adventure",
            QuestCategory::Advanced,
            "Understand the power of compounding.",
            "You have ₹2,000 extra every month. You are deciding between keeping it in a zero-interest locker or starting a Mutual Fund SIP.",
            vec![
                choice(
                    "Keep it in the locker for safety.",
                    "While safe, inflation will reduce the value of your money over time.",
                    10, 5, 0, false,
                ),
                choice(
                    "Start an Equity SIP for long-term goals.",
                    "Great choice! Compounding works best over long periods. You are on your way to becoming a Wealth Builder!",
                    80, 50, 25, true,
                ),
            ],
            Difficulty::Hard,
            "80 XP • 50 Coins",
            "📈",
        ),
    ]
}

fn toolkit_item(id: &str, title: &str, content: &str, icon: &str, color: &str) -> ToolkitItem {
    ToolkitItem {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        icon: icon.to_string(),
        color: color.to_string(),
    }
}

fn bundled_toolkit() -> Vec<ToolkitItem> {
    vec![
        toolkit_item(
            "t1",
            "Budgeting 101",
            "The 50/30/20 rule: 50% for Needs, 30% for Wants, and 20% for Savings. Always track your expenses using an app or a diary.",
            "📊",
            "bg-blue-100 text-blue-600",
        ),
        toolkit_item(
            "t2",
            "UPI Safety",
            "Never enter your UPI PIN to receive money. Only enter your PIN when you are making a payment. QR codes are for scanning to PAY.",
            "📲",
            "bg-green-100 text-green-600",
        ),
        toolkit_item(
            "t3",
            "Credit Score",
            "A score above 750 is considered good. Pay your credit card bills in full and on time to maintain a healthy score.",
            "💳",
            "bg-purple-100 text-purple-600",
        ),
    ]
}

fn challenge(question: &str, options: &[&str], correct_index: usize, explanation: &str, reward: u32) -> DailyChallenge {
    DailyChallenge {
        question: question.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_index,
        explanation: explanation.to_string(),
        reward,
    }
}

fn bundled_daily_pool() -> Vec<DailyChallenge> {
    vec![
        challenge(
            "What is the maximum amount covered by deposit insurance (DICGC) per bank account in India?",
            &["₹1 Lakh", "₹5 Lakhs", "₹10 Lakhs", "Unlimited"],
            1,
            "Since 2020, the DICGC covers up to ₹5 Lakhs per depositor, per bank, including principal and interest.",
            20,
        ),
        challenge(
            "When do you need to enter your UPI PIN?",
            &["To receive money", "To make a payment", "To check a notification", "To scan a prize QR code"],
            1,
            "Your UPI PIN is only ever needed to send money. Anyone asking for it to \"receive\" a payment is a scammer.",
            20,
        ),
        challenge(
            "In the 50/30/20 budgeting rule, what share of income goes to savings?",
            &["50%", "30%", "20%", "10%"],
            2,
            "50% covers needs, 30% covers wants and 20% is set aside for savings before anything else.",
            20,
        ),
        challenge(
            "Which credit score is generally considered good in India?",
            &["300 to 500", "550 to 650", "750 and above", "Any score is fine"],
            2,
            "Lenders treat a CIBIL score of 750 or more as good. Paying card bills in full and on time keeps it there.",
            25,
        ),
        challenge(
            "What does SIP stand for in mutual fund investing?",
            &["Systematic Investment Plan", "Secure Interest Policy", "Simple Insurance Premium", "Savings Incentive Program"],
            0,
            "A Systematic Investment Plan invests a fixed amount every month, letting compounding and rupee-cost averaging work for you.",
            25,
        ),
    ]
}
