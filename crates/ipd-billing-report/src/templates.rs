//! Handlebars templates for printable bills.
//!
//! Templates only lay values out; every amount arrives pre-formatted.

/// Template name for the final bill.
pub const FINAL_BILL: &str = "final_bill";

/// Template name for the quick charge-sheet receipt.
pub const CHARGE_SHEET: &str = "charge_sheet";

/// Full final bill printed at discharge.
pub const FINAL_BILL_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Final Bill - {{patient.full_name}}</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 0; padding: 20px; color: #222; }
    .container { max-width: 800px; margin: 0 auto; }
    .header { text-align: center; border-bottom: 2px solid #333; padding-bottom: 12px; margin-bottom: 20px; }
    .header h1 { font-size: 18px; margin: 0 0 6px 0; }
    .header h2 { font-size: 16px; margin: 0; letter-spacing: 2px; }
    .patient-info { display: grid; grid-template-columns: 1fr 1fr; gap: 6px 24px; margin-bottom: 20px; }
    .patient-info .value { margin-left: 6px; }
    .section-title { font-weight: bold; background: #f0f0f0; padding: 6px 8px; margin: 16px 0 8px 0; }
    table { width: 100%; border-collapse: collapse; }
    th, td { border: 1px solid #999; padding: 6px 8px; text-align: left; }
    td.amount, th.amount { text-align: right; }
    .total-row td { font-weight: bold; background: #fafafa; }
    .deposit-box { border: 1px solid #333; padding: 10px 14px; margin-top: 16px; }
    .deposit-box div { display: flex; justify-content: space-between; margin: 4px 0; }
    .refund { color: #15803d; font-weight: bold; }
    .due { color: #b91c1c; font-weight: bold; }
    .warnings { border: 1px dashed #b45309; color: #b45309; padding: 8px 12px; margin-top: 16px; }
    .total-amount { font-size: 18px; font-weight: bold; text-align: right; margin-top: 16px; }
    .signature { margin-top: 60px; text-align: right; }
    .footer { margin-top: 24px; font-size: 10px; color: #777; }
    @media print { .warnings { display: none; } }
  </style>
</head>
<body>
  <div class="container">
    <div class="header">
      <h1>{{hospital_name}}</h1>
      <h2>FINAL BILL</h2>
    </div>

    <div class="patient-info">
      <div><b>Patient Name:</b><span class="value">{{patient.full_name}}</span></div>
      <div><b>IP No:</b><span class="value">{{patient.ipd_no}}</span></div>
      <div><b>UHID No:</b><span class="value">{{patient.uhid}}</span></div>
      <div><b>Age:</b><span class="value">{{patient.age}}</span></div>
      <div><b>Sex:</b><span class="value">{{patient.gender}}</span></div>
      <div><b>Ward/Bed No:</b><span class="value">{{patient.ward_bed}}</span></div>
      <div><b>Date of Admission:</b><span class="value">{{patient.admission_date}}</span></div>
      <div><b>Date of Discharge:</b><span class="value">{{patient.discharge_date}}</span></div>
      <div><b>Total Days:</b><span class="value">{{total_days}}</span></div>
      <div><b>Room Type:</b><span class="value">{{patient.room_type}}</span></div>
      <div><b>Deposit Amount:</b><span class="value">{{deposit_amount}}</span></div>
    </div>

    {{#if has_procedures}}
    <div class="section-title">PROCEDURE DETAILS</div>
    <table class="procedure-table">
      <thead>
        <tr>
          <th>Procedure Name</th>
          <th>Start Date</th>
          <th>End Date</th>
          <th>Days</th>
          <th class="amount">Rate/Day</th>
          <th class="amount">Total Cost</th>
        </tr>
      </thead>
      <tbody>
        {{#each procedures}}
        <tr>
          <td>{{name}}</td>
          <td>{{start_date}}</td>
          <td>{{end_date}}</td>
          <td>{{days}}</td>
          <td class="amount">{{rate}}</td>
          <td class="amount">{{total}}</td>
        </tr>
        {{/each}}
      </tbody>
    </table>
    {{/if}}

    <div class="section-title">BILL SUMMARY</div>
    <table class="bill-table">
      <thead>
        <tr>
          <th>Description</th>
          <th>Days</th>
          <th class="amount">Rate per Day</th>
          <th class="amount">Amount</th>
        </tr>
      </thead>
      <tbody>
        {{#each summary}}
        <tr>
          <td>{{description}}</td>
          <td>{{days}}</td>
          <td class="amount">{{rate}}</td>
          <td class="amount">{{amount}}</td>
        </tr>
        {{/each}}
        <tr class="total-row">
          <td colspan="3">TOTAL AMOUNT</td>
          <td class="amount">{{total_amount}}</td>
        </tr>
      </tbody>
    </table>

    <div class="deposit-box">
      <div><span>Deposit Amount:</span><span>{{deposit_amount}}</span></div>
      {{#if is_refund}}
      <div class="refund"><span>Returnable Amount:</span><span>{{returnable_amount}}</span></div>
      {{/if}}
      {{#if is_due}}
      <div class="due"><span>Additional Cost:</span><span>{{additional_cost}}</span></div>
      {{/if}}
      {{#if is_settled}}
      <div><span>Balance:</span><span>Settled</span></div>
      {{/if}}
    </div>

    {{#if has_warnings}}
    <div class="warnings">
      <b>Check before issuing:</b>
      <ul>
        {{#each warnings}}
        <li>{{this}}</li>
        {{/each}}
      </ul>
    </div>
    {{/if}}

    <div class="total-amount">Total Amount: {{total_amount}}</div>

    <div class="signature">
      <p><strong>Authorized Signature:</strong></p>
      <p>_______________________</p>
    </div>

    <div class="footer">Document {{document_id}} &middot; generated {{generated_at}} &middot; {{fingerprint}}</div>
  </div>
</body>
</html>
"#;

/// Quick itemised receipt from the billing counter.
pub const CHARGE_SHEET_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>IPD Bill Receipt</title>
  <style>
    body { font-family: sans-serif; }
    .receipt { max-width: 400px; margin: auto; border: 1px solid #ccc; padding: 24px; border-radius: 8px; }
    .receipt h2 { text-align: center; }
    .receipt table { width: 100%; margin-top: 16px; }
    .receipt td { padding: 4px 0; }
    .receipt td.amount { text-align: right; }
    .receipt .total { font-weight: bold; color: #15803d; }
  </style>
</head>
<body>
  <div class="receipt">
    <h2>IPD Bill Receipt</h2>
    <table>
      {{#each lines}}
      <tr><td>{{label}}:</td><td class="amount">{{amount}}</td></tr>
      {{/each}}
      <tr><td class="total">Total:</td><td class="total amount">{{total}}</td></tr>
    </table>
  </div>
</body>
</html>
"#;
