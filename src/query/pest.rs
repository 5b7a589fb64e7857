use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "query/grammar.pest"]
struct SelectorPairs;

pub(crate) type Pair<'a> = pest::iterators::Pair<'a, Rule>;
pub(crate) type Pairs<'a> = pest::iterators::Pairs<'a, Rule>;

pub(crate) fn parse_selector(text: &str) -> Result<Pairs<'_>, pest::error::Error<Rule>> {
    SelectorPairs::parse(Rule::selector, text)
}
