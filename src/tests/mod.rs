mod backtracking;
mod randomised;
mod scenarios;
