//! Locally synthesized article used when every hosted provider fails.
//!
//! Pure string assembly: the same topic always yields the same markdown.

use crate::generation::article::title_case;

pub fn fallback_article(topic: &str) -> String {
    let topic = topic.trim();
    let title = title_case(topic);
    let lower = topic.to_lowercase();

    format!(
        "# {title}: A Practical Guide\n\
        \n\
        {title} comes up constantly in modern software work. This guide walks through what \
        {lower} is, why teams adopt it, and how to get productive with it quickly.\n\
        \n\
        ## What Is {title}?\n\
        \n\
        At its core, {lower} is a set of ideas and tools that solve a recurring problem. \
        Understanding the problem it addresses makes every later decision easier, so start \
        by writing down what you expect {lower} to do for your project.\n\
        \n\
        ## Key Concepts\n\
        \n\
        - **Fundamentals**: learn the vocabulary and the core building blocks of {lower}.\n\
        - **Workflow**: understand how {lower} fits into day-to-day development.\n\
        - **Ecosystem**: know which libraries, services and integrations surround it.\n\
        \n\
        ## Getting Started\n\
        \n\
        1. Read the official documentation and follow the introductory tutorial.\n\
        2. Build a small, throwaway project that exercises the main features.\n\
        3. Compare your result against community examples and refine it.\n\
        \n\
        ## Best Practices\n\
        \n\
        Keep configurations small and explicit, automate repetitive steps, and review changes \
        regularly. Measure before optimizing, and document the decisions you make about \
        {lower} so the rest of your team can follow them.\n\
        \n\
        ## Common Pitfalls\n\
        \n\
        Most problems with {lower} come from skipping the fundamentals or copying setups \
        without understanding them. When something breaks, reduce the problem to the smallest \
        reproducible case before changing anything else.\n\
        \n\
        ## Conclusion\n\
        \n\
        {title} rewards steady, hands-on practice. Start small, iterate often, and expand your \
        use of {lower} as your confidence grows.\n"
    )
}
