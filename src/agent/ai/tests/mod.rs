// Search and evaluation test suites

mod evaluation_tests;
