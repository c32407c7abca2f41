pub mod input;
pub mod render;

pub const USAGE: &str = "\
commands:
  add <url>        submit a URL for crawling
  start <id>       resume a stopped crawl
  stop <id>        halt a running or queued crawl
  delete <id>      remove a URL and its results
  reanalyze <id>   queue a finished crawl again
  details <id>     show the analysis of a crawl
  refresh          reload the job list from the service
  list             show the job list
  help             show this text
  quit             exit";
